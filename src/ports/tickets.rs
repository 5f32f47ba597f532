//! Ticket store port: read-only access to the source tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PortError;

/// A source ticket, read once per migration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket number; becomes the destination issue number.
    pub id: u64,
    /// Ticket type (`defect`, `enhancement`, ...).
    pub kind: String,
    /// Assigned user.
    pub owner: String,
    /// User who opened the ticket.
    pub reporter: String,
    /// Milestone name, empty when unset.
    pub milestone: String,
    /// Workflow status (`new`, `closed`, ...).
    pub status: String,
    /// Resolution of a closed ticket.
    pub resolution: String,
    /// One-line summary; becomes the issue title.
    pub summary: String,
    /// Wiki-formatted description.
    pub description: String,
    /// Component name.
    pub component: String,
    /// Priority name.
    pub priority: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last modification time.
    pub changed: DateTime<Utc>,
}

impl Ticket {
    /// Value of one of the label-bearing fields, by its Trac column name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "type" => Some(&self.kind),
            "component" => Some(&self.component),
            "priority" => Some(&self.priority),
            "resolution" => Some(&self.resolution),
            "milestone" => Some(&self.milestone),
            "status" => Some(&self.status),
            _ => None,
        }
    }
}

/// A comment left on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Ticket the comment belongs to.
    pub ticket: u64,
    /// When it was posted; `None` when the store has no usable time.
    pub time: Option<DateTime<Utc>>,
    /// Commenter.
    pub author: String,
    /// Wiki-formatted text.
    pub text: String,
}

/// A file attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Ticket the file is attached to.
    pub ticket: u64,
    /// When it was attached; `None` when the store has no usable time.
    pub time: Option<DateTime<Utc>>,
    /// Uploader.
    pub author: String,
    /// Wiki-formatted description.
    pub description: String,
    /// Stored file name.
    pub filename: String,
}

/// Milestone metadata held by the source tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneInfo {
    /// Milestone name.
    pub name: String,
    /// Due date, if one was set.
    pub due: Option<DateTime<Utc>>,
    /// Whether the milestone has been completed.
    pub completed: bool,
    /// Wiki-formatted description.
    pub description: String,
}

/// Which tickets to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketQuery {
    /// Smallest ticket id to include.
    pub start: u64,
    /// Maximum number of tickets, unbounded when `None`.
    pub limit: Option<u64>,
}

impl Default for TicketQuery {
    fn default() -> Self {
        Self { start: 1, limit: None }
    }
}

/// Read-only source of tickets and their history.
///
/// Abstracting the store lets the pipeline run against an in-memory fake
/// in tests instead of a real tracker database.
pub trait TicketStore: Send {
    /// Tickets with `id >= query.start`, ascending by id, at most `query.limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn tickets(
        &self,
        query: &TicketQuery,
    ) -> Result<Vec<Ticket>, PortError>;

    /// Non-empty comments on one ticket, ascending by time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn comments(&self, ticket: u64)
        -> Result<Vec<Comment>, PortError>;

    /// Attachments on one ticket, ascending by time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn attachments(
        &self,
        ticket: u64,
    ) -> Result<Vec<Attachment>, PortError>;

    /// Milestone metadata by exact name; `None` when the store has no such milestone.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn milestone(
        &self,
        name: &str,
    ) -> Result<Option<MilestoneInfo>, PortError>;
}
