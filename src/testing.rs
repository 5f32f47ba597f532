//! In-memory fakes of the ports for unit tests.

use std::sync::{Arc, Mutex};

use crate::context::ServiceContext;
use crate::error::PortError;
use crate::payload::ExportPayload;
use crate::ports::exporter::{ImportReceipt, IssueExporter};
use crate::ports::remote::{LabelHandle, MilestoneHandle, NewMilestone, RemoteRepo};
use crate::ports::tickets::{Attachment, Comment, MilestoneInfo, Ticket, TicketQuery, TicketStore};

/// Ticket store backed by vectors.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub tickets: Vec<Ticket>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
    pub milestones: Vec<MilestoneInfo>,
}

impl MemoryStore {
    pub fn with_ticket(mut self, ticket: Ticket) -> Self {
        self.tickets.push(ticket);
        self
    }

    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.push(comment);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_milestone(mut self, milestone: MilestoneInfo) -> Self {
        self.milestones.push(milestone);
        self
    }
}

impl TicketStore for MemoryStore {
    fn tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>, PortError> {
        let mut tickets: Vec<Ticket> =
            self.tickets.iter().filter(|t| t.id >= query.start).cloned().collect();
        tickets.sort_by_key(|t| t.id);
        if let Some(limit) = query.limit {
            tickets.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(tickets)
    }

    fn comments(&self, ticket: u64) -> Result<Vec<Comment>, PortError> {
        Ok(self.comments.iter().filter(|c| c.ticket == ticket).cloned().collect())
    }

    fn attachments(&self, ticket: u64) -> Result<Vec<Attachment>, PortError> {
        Ok(self.attachments.iter().filter(|a| a.ticket == ticket).cloned().collect())
    }

    fn milestone(&self, name: &str) -> Result<Option<MilestoneInfo>, PortError> {
        Ok(self.milestones.iter().find(|m| m.name == name).cloned())
    }
}

#[derive(Debug, Default)]
struct RemoteState {
    labels: Vec<LabelHandle>,
    milestones: Vec<MilestoneHandle>,
    created_labels: Vec<(String, String)>,
    created_milestones: Vec<NewMilestone>,
    exported: Vec<ExportPayload>,
    users: Vec<String>,
    fail_creates: bool,
    fail_export_of: Option<String>,
}

/// Destination fake recording every mutation. Clones share state.
#[derive(Debug, Default, Clone)]
pub struct FakeRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl FakeRemote {
    pub fn with_labels(names: &[&str]) -> Self {
        let remote = Self::default();
        remote.state.lock().unwrap().labels = names
            .iter()
            .map(|n| LabelHandle { name: (*n).to_string(), color: "ededed".into() })
            .collect();
        remote
    }

    pub fn with_milestones(titles: &[&str]) -> Self {
        let remote = Self::default();
        remote.state.lock().unwrap().milestones = titles
            .iter()
            .zip(1..)
            .map(|(t, number)| MilestoneHandle {
                number,
                title: (*t).to_string(),
                state: crate::ports::remote::MilestoneState::Open,
            })
            .collect();
        remote
    }

    pub fn with_users(self, logins: &[&str]) -> Self {
        self.state.lock().unwrap().users = logins.iter().map(|l| (*l).to_string()).collect();
        self
    }

    pub fn fail_creates(&self) {
        self.state.lock().unwrap().fail_creates = true;
    }

    pub fn fail_export_of(&self, title: &str) {
        self.state.lock().unwrap().fail_export_of = Some(title.to_string());
    }

    pub fn created_labels(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().created_labels.clone()
    }

    pub fn created_milestones(&self) -> Vec<NewMilestone> {
        self.state.lock().unwrap().created_milestones.clone()
    }

    pub fn exported(&self) -> Vec<ExportPayload> {
        self.state.lock().unwrap().exported.clone()
    }
}

impl RemoteRepo for FakeRemote {
    fn list_labels(&self) -> Result<Vec<LabelHandle>, PortError> {
        Ok(self.state.lock().unwrap().labels.clone())
    }

    fn create_label(&self, name: &str, color: &str) -> Result<LabelHandle, PortError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_creates {
            return Err("422 Validation Failed".into());
        }
        state.created_labels.push((name.to_string(), color.to_string()));
        let label = LabelHandle { name: name.to_string(), color: color.to_string() };
        state.labels.push(label.clone());
        Ok(label)
    }

    fn list_milestones(&self) -> Result<Vec<MilestoneHandle>, PortError> {
        Ok(self.state.lock().unwrap().milestones.clone())
    }

    fn create_milestone(&self, milestone: &NewMilestone) -> Result<MilestoneHandle, PortError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_creates {
            return Err("422 Validation Failed".into());
        }
        state.created_milestones.push(milestone.clone());
        let handle = MilestoneHandle {
            number: state.milestones.len() as u64 + 1,
            title: milestone.title.clone(),
            state: milestone.state,
        };
        state.milestones.push(handle.clone());
        Ok(handle)
    }

    fn user_exists(&self, login: &str) -> Result<bool, PortError> {
        Ok(self.state.lock().unwrap().users.iter().any(|u| u == login))
    }
}

impl IssueExporter for FakeRemote {
    fn export(&self, payload: &ExportPayload) -> Result<ImportReceipt, PortError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_export_of.as_deref() == Some(payload.issue.title.as_str()) {
            return Err("502 Bad Gateway".into());
        }
        state.exported.push(payload.clone());
        let id = state.exported.len() as u64;
        Ok(ImportReceipt {
            id,
            status: "pending".into(),
            url: format!("https://api.github.com/repos/o/r/import/issues/{id}"),
        })
    }

    fn import_status(&self, id: u64) -> Result<ImportReceipt, PortError> {
        let state = self.state.lock().unwrap();
        if id == 0 || id as usize > state.exported.len() {
            return Err(format!("import {id} not found").into());
        }
        Ok(ImportReceipt {
            id,
            status: "imported".into(),
            url: format!("https://api.github.com/repos/o/r/import/issues/{id}"),
        })
    }
}

/// Context wiring `store` as the ticket store and `remote` as both remote ports.
pub fn context(store: MemoryStore, remote: &FakeRemote) -> ServiceContext {
    ServiceContext::new(Box::new(store), Box::new(remote.clone()), Box::new(remote.clone()))
}
