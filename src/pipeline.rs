//! The sequential migration loop.
//!
//! Tickets are exported one at a time in ascending id order. The first
//! fatal error stops the run and reports the ticket to resume from; labels
//! and milestones created before the failure stay in place and are picked
//! up again by the next run's cache population.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::assemble::TicketAssembler;
use crate::config::MigrateConfig;
use crate::context::ServiceContext;
use crate::convert::TextConverter;
use crate::error::{HaltedAt, MigrateError};
use crate::payload::ExportPayload;
use crate::ports::exporter::ImportReceipt;
use crate::ports::remote::RemoteRepo;
use crate::ports::tickets::{Ticket, TicketQuery};
use crate::reconcile::MetadataReconciler;
use crate::revmap::RevisionMap;
use crate::timeline::merge;

/// Options for one pass over the ticket store.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Which tickets to migrate.
    pub query: TicketQuery,
    /// Directory receiving a `<ticket>.json` copy of every payload.
    pub out_dir: Option<PathBuf>,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Number of tickets exported.
    pub exported: usize,
    /// Id of the last exported ticket.
    pub last_ticket: Option<u64>,
    /// Labels known at the end of the run.
    pub labels: usize,
    /// Milestones known at the end of the run.
    pub milestones: usize,
}

impl MigrationReport {
    /// Start cursor for a follow-up run.
    #[must_use]
    pub fn next_start(&self) -> Option<u64> {
        self.last_ticket.map(|id| id + 1)
    }
}

/// A migration with populated metadata caches.
pub struct Migration<'a> {
    ctx: &'a ServiceContext,
    assembler: TicketAssembler<'a>,
}

impl<'a> Migration<'a> {
    /// Seeds the label and milestone caches from the destination.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::RemoteListing`] if the destination cannot be enumerated.
    pub fn start(
        ctx: &'a ServiceContext,
        config: &'a MigrateConfig,
        converter: &'a TextConverter,
    ) -> Result<Self, MigrateError> {
        let mut reconciler =
            MetadataReconciler::new(ctx, &config.labels, &config.default_label_color, converter);
        reconciler.populate()?;
        Ok(Self { ctx, assembler: TicketAssembler::new(config, converter, reconciler) })
    }

    /// Exports every ticket selected by `options`, in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns [`HaltedAt`] naming the first ticket that could not be
    /// exported. Tickets before it have been exported; it and everything
    /// after it have not.
    pub fn run(&mut self, options: &RunOptions) -> Result<MigrationReport, HaltedAt> {
        let start = options.query.start;
        let tickets = self
            .ctx
            .tickets
            .tickets(&options.query)
            .map_err(|e| HaltedAt { ticket: start, source: MigrateError::TicketStore(e) })?;
        info!("migrating {} tickets starting at #{start}", tickets.len());

        let mut report = MigrationReport::default();
        let mut expected = start;
        for ticket in &tickets {
            if ticket.id != expected {
                warn!(
                    "ticket ids jump from #{expected} to #{}; destination numbering will drift",
                    ticket.id
                );
            }
            let receipt = self
                .migrate_ticket(ticket, options.out_dir.as_deref())
                .map_err(|source| HaltedAt { ticket: ticket.id, source })?;
            info!(
                ticket = ticket.id,
                import = receipt.id,
                status = %receipt.status,
                "exported {:?}",
                ticket.summary
            );
            report.exported += 1;
            report.last_ticket = Some(ticket.id);
            expected = ticket.id + 1;
        }

        report.labels = self.assembler.reconciler().label_count();
        report.milestones = self.assembler.reconciler().milestone_count();
        Ok(report)
    }

    fn migrate_ticket(
        &mut self,
        ticket: &Ticket,
        out_dir: Option<&Path>,
    ) -> Result<ImportReceipt, MigrateError> {
        let comments = self.ctx.tickets.comments(ticket.id).map_err(MigrateError::TicketStore)?;
        let attachments =
            self.ctx.tickets.attachments(ticket.id).map_err(MigrateError::TicketStore)?;
        debug!(
            "ticket #{} has {} comments and {} attachments",
            ticket.id,
            comments.len(),
            attachments.len()
        );

        let payload = self.assembler.assemble(ticket, merge(comments, attachments))?;
        if let Some(dir) = out_dir {
            write_payload(dir, ticket.id, &payload)?;
        }
        self.ctx
            .exporter
            .export(&payload)
            .map_err(|source| MigrateError::Export { ticket: ticket.id, source })
    }
}

fn write_payload(dir: &Path, ticket: u64, payload: &ExportPayload) -> Result<(), MigrateError> {
    let path = dir.join(format!("{ticket}.json"));
    let output_error = |source: std::io::Error| MigrateError::Output { path: path.clone(), source };
    std::fs::create_dir_all(dir).map_err(output_error)?;
    let json = serde_json::to_string_pretty(payload)
        .map_err(|e| output_error(std::io::Error::other(e)))?;
    std::fs::write(&path, json + "\n").map_err(output_error)?;
    debug!("wrote {}", path.display());
    Ok(())
}

/// Builds the text converter, loading the revision map when one is configured.
///
/// # Errors
///
/// Returns [`MigrateError::RevisionMap`] if the map cannot be read.
pub fn load_converter(config: &MigrateConfig) -> Result<TextConverter, MigrateError> {
    let revisions = match &config.revmap {
        Some(path) => RevisionMap::load(path)?,
        None => RevisionMap::empty(),
    };
    Ok(TextConverter::new(revisions))
}

/// Checks that every mapped GitHub login exists.
///
/// # Errors
///
/// Returns [`MigrateError::UnknownUser`] for the first login that does not
/// exist and [`MigrateError::UserLookup`] if a lookup fails.
pub fn validate_users(remote: &dyn RemoteRepo, config: &MigrateConfig) -> Result<(), MigrateError> {
    for (trac, login) in &config.users {
        match remote.user_exists(login) {
            Ok(true) => debug!("user {trac} -> @{login} exists"),
            Ok(false) => {
                return Err(MigrateError::UnknownUser { trac: trac.clone(), login: login.clone() });
            }
            Err(source) => {
                return Err(MigrateError::UserLookup { login: login.clone(), source });
            }
        }
    }
    info!("validated {} user mappings", config.users.len());
    Ok(())
}
