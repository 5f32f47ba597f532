//! Remote metadata port: labels, milestones and users on the destination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PortError;

/// A label that exists on the destination repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelHandle {
    /// Display name.
    pub name: String,
    /// Six-digit hex color without `#`.
    pub color: String,
}

/// Open/closed state of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    /// Still accepting work.
    Open,
    /// Completed.
    Closed,
}

impl MilestoneState {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// A milestone that exists on the destination repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneHandle {
    /// Repository-scoped milestone number used by issue payloads.
    pub number: u64,
    /// Milestone title.
    pub title: String,
    /// Current state.
    pub state: MilestoneState,
}

/// Request to create a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMilestone {
    /// Milestone title.
    pub title: String,
    /// Initial state.
    pub state: MilestoneState,
    /// Markdown description, omitted when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Due date, omitted when absent.
    #[serde(rename = "due_on", skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
}

/// Mutable metadata on the destination repository.
///
/// Creation calls are not idempotent on the remote side; callers keep a
/// local cache so that each name is created at most once.
pub trait RemoteRepo: Send + Sync {
    /// Lists every existing label.
    ///
    /// # Errors
    ///
    /// Returns an error if the labels cannot be listed.
    fn list_labels(&self) -> Result<Vec<LabelHandle>, PortError>;

    /// Creates a label.
    ///
    /// # Errors
    ///
    /// Returns an error if the label cannot be created.
    fn create_label(
        &self,
        name: &str,
        color: &str,
    ) -> Result<LabelHandle, PortError>;

    /// Lists every existing milestone, open and closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the milestones cannot be listed.
    fn list_milestones(
        &self,
    ) -> Result<Vec<MilestoneHandle>, PortError>;

    /// Creates a milestone.
    ///
    /// # Errors
    ///
    /// Returns an error if the milestone cannot be created.
    fn create_milestone(
        &self,
        milestone: &NewMilestone,
    ) -> Result<MilestoneHandle, PortError>;

    /// Returns `true` if a user with this login exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    fn user_exists(&self, login: &str) -> Result<bool, PortError>;
}
