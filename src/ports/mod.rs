//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the migration core and an
//! external system (the source tracker, destination metadata, issue import).
//! Implementations live in `src/adapters/`.

pub mod exporter;
pub mod remote;
pub mod tickets;

pub use exporter::{ImportReceipt, IssueExporter};
pub use remote::{LabelHandle, MilestoneHandle, MilestoneState, NewMilestone, RemoteRepo};
pub use tickets::{Attachment, Comment, MilestoneInfo, Ticket, TicketQuery, TicketStore};
