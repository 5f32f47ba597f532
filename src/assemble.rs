//! Builds one export payload per ticket.

use std::fmt::Write as _;

use crate::config::{MigrateConfig, LABEL_FIELDS};
use crate::convert::TextConverter;
use crate::error::MigrateError;
use crate::payload::{CommentPayload, ExportPayload, IssuePayload};
use crate::ports::tickets::{Attachment, Comment, Ticket};
use crate::reconcile::{label_key, MetadataReconciler};
use crate::timeline::TimelineEvent;

/// Renders tickets and their history into [`ExportPayload`]s.
pub struct TicketAssembler<'a> {
    config: &'a MigrateConfig,
    converter: &'a TextConverter,
    reconciler: MetadataReconciler<'a>,
}

impl<'a> TicketAssembler<'a> {
    /// Creates an assembler over an already populated reconciler.
    #[must_use]
    pub fn new(
        config: &'a MigrateConfig,
        converter: &'a TextConverter,
        reconciler: MetadataReconciler<'a>,
    ) -> Self {
        Self { config, converter, reconciler }
    }

    /// The reconciler, for cache statistics.
    #[must_use]
    pub fn reconciler(&self) -> &MetadataReconciler<'a> {
        &self.reconciler
    }

    /// Assembles the payload for `ticket`.
    ///
    /// Output depends only on the inputs and the reconciler caches, so the
    /// same ticket always yields the same payload.
    ///
    /// # Errors
    ///
    /// Returns an error if a label or milestone has to be created and the
    /// remote call fails.
    pub fn assemble(
        &mut self,
        ticket: &Ticket,
        timeline: impl IntoIterator<Item = TimelineEvent>,
    ) -> Result<ExportPayload, MigrateError> {
        let labels = self.labels(ticket)?;
        let milestone = self.reconciler.resolve_milestone(&ticket.milestone)?;
        let closed = ticket.status == self.config.closed_status;

        let comments = timeline
            .into_iter()
            .map(|event| CommentPayload {
                created_at: event.time().unwrap_or(ticket.created),
                body: match &event {
                    TimelineEvent::Comment(comment) => self.comment_body(comment),
                    TimelineEvent::Attachment(attachment) => self.attachment_body(attachment),
                },
            })
            .collect();

        Ok(ExportPayload {
            issue: IssuePayload {
                title: ticket.summary.trim().to_string(),
                body: self.issue_body(ticket),
                created_at: ticket.created,
                updated_at: ticket.changed,
                closed_at: closed.then_some(ticket.changed),
                closed,
                assignee: self.config.github_login(&ticket.owner).map(str::to_string),
                milestone: milestone.map(|m| m.number),
                labels,
            },
            comments,
        })
    }

    fn labels(&mut self, ticket: &Ticket) -> Result<Vec<String>, MigrateError> {
        let mut names: Vec<String> = Vec::new();
        for field in LABEL_FIELDS {
            let Some(value) = ticket.field(field).filter(|v| !v.is_empty()) else {
                continue;
            };
            if let Some(label) = self.reconciler.resolve_label(field, value)? {
                if !names.iter().any(|n| label_key(n) == label_key(&label.name)) {
                    names.push(label.name);
                }
            }
        }
        Ok(names)
    }

    fn issue_body(&self, ticket: &Ticket) -> String {
        let mut body = format!("**Reported by {}**", self.attribution(&ticket.reporter));
        let description = self.converter.convert(&ticket.description);
        if !description.is_empty() {
            let _ = write!(body, "\n\n{description}");
        }
        if let Some(prefix) = &self.config.trac.ticket_url {
            let _ = write!(body, "\n\n---\nMigrated from {prefix}{}", ticket.id);
        }
        body
    }

    fn comment_body(&self, comment: &Comment) -> String {
        let mut body = format!("**{}** commented:", self.attribution(&comment.author));
        let text = self.converter.convert(&comment.text);
        if !text.is_empty() {
            let _ = write!(body, "\n\n{text}");
        }
        body
    }

    fn attachment_body(&self, attachment: &Attachment) -> String {
        let file = match &self.config.trac.attachment_url {
            Some(prefix) => format!(
                "[`{}`]({prefix}{}/{})",
                attachment.filename,
                attachment.ticket,
                encode_path_segment(&attachment.filename)
            ),
            None => format!("`{}`", attachment.filename),
        };
        let mut body = format!("**{}** attached {file}", self.attribution(&attachment.author));
        let description = self.converter.convert(&attachment.description);
        if !description.is_empty() {
            let _ = write!(body, "\n\n{description}");
        }
        body
    }

    fn attribution(&self, trac_user: &str) -> String {
        match self.config.github_login(trac_user) {
            Some(login) => format!("@{login}"),
            None if trac_user.trim().is_empty() => "anonymous".to_string(),
            None => trac_user.to_string(),
        }
    }
}

/// Percent-encodes the characters that would break a Markdown link target.
fn encode_path_segment(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            ' ' => encoded.push_str("%20"),
            '(' => encoded.push_str("%28"),
            ')' => encoded.push_str("%29"),
            '#' => encoded.push_str("%23"),
            '?' => encoded.push_str("%3F"),
            _ => encoded.push(c),
        }
    }
    encoded
}
