//! Wire format of one issue import request.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Everything needed to create one issue with its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPayload {
    /// The issue itself.
    pub issue: IssuePayload,
    /// Comments in chronological order.
    pub comments: Vec<CommentPayload>,
}

/// Issue fields of an [`ExportPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuePayload {
    /// Issue title.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Creation time.
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
    /// Last update time.
    #[serde(serialize_with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    /// Close time, present only for closed issues.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "iso8601_opt")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Whether the issue is closed.
    pub closed: bool,
    /// Assignee login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Milestone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    /// Label names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// One comment of an [`ExportPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentPayload {
    /// Posting time.
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
    /// Markdown body.
    pub body: String,
}

fn iso8601<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[allow(clippy::ref_option)]
fn iso8601_opt<S: Serializer>(
    time: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(time) => iso8601(time, serializer),
        None => serializer.serialize_none(),
    }
}
