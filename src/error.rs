//! Error taxonomy for a migration run.
//!
//! Configuration gaps (an unconfigured label, a milestone missing from the
//! ticket store, an unmapped revision) are not errors and never appear here.
//! Everything in [`MigrateError`] halts the run.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by port implementations.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal failures of a migration run.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The configuration file could not be read or parsed.
    #[error("invalid configuration {}: {message}", path.display())]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A required setting is absent (for example `GITHUB_TOKEN`).
    #[error("missing setting: {0}")]
    MissingSetting(String),

    /// The revision map source could not be read.
    #[error("cannot read revision map {}: {source}", path.display())]
    RevisionMap {
        /// Path of the revision map file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client for the destination could not be built.
    #[error("cannot build GitHub client: {0}")]
    Client(#[source] PortError),

    /// The ticket store could not be opened or queried.
    #[error("ticket store error: {0}")]
    TicketStore(#[source] PortError),

    /// Listing the labels or milestones that already exist remotely failed.
    #[error("failed to enumerate remote {what}: {source}")]
    RemoteListing {
        /// "labels" or "milestones".
        what: &'static str,
        /// Underlying remote failure.
        #[source]
        source: PortError,
    },

    /// Creating a label remotely failed.
    #[error("failed to create label '{name}': {source}")]
    LabelCreate {
        /// Display name of the label.
        name: String,
        /// Underlying remote failure.
        #[source]
        source: PortError,
    },

    /// Creating a milestone remotely failed.
    #[error("failed to create milestone '{name}': {source}")]
    MilestoneCreate {
        /// Milestone title.
        name: String,
        /// Underlying remote failure.
        #[source]
        source: PortError,
    },

    /// Handing an assembled payload to the exporter failed.
    #[error("failed to export ticket #{ticket}: {source}")]
    Export {
        /// Source ticket id.
        ticket: u64,
        /// Underlying remote failure.
        #[source]
        source: PortError,
    },

    /// A mapped GitHub login does not exist.
    #[error("trac user '{trac}' must map to an existing GitHub user instead of '{login}'")]
    UnknownUser {
        /// Trac username.
        trac: String,
        /// Configured GitHub login.
        login: String,
    },

    /// Checking a mapped GitHub login failed for a reason other than absence.
    #[error("failed to look up GitHub user '{login}': {source}")]
    UserLookup {
        /// Configured GitHub login.
        login: String,
        /// Underlying remote failure.
        #[source]
        source: PortError,
    },

    /// Writing a dry-run payload to disk failed.
    #[error("failed to write {}: {source}", path.display())]
    Output {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// A fatal error tagged with the ticket being processed when it occurred.
#[derive(Debug, Error)]
#[error("ticket #{ticket} failed ({source}); resume with --start {ticket}")]
pub struct HaltedAt {
    /// Ticket whose processing failed; nothing from it was exported.
    pub ticket: u64,
    /// The failure.
    #[source]
    pub source: MigrateError,
}
