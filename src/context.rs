//! Service context bundling all port trait objects.

use std::sync::Arc;

use crate::adapters::dry_run::DryRun;
use crate::adapters::github::GitHubClient;
use crate::adapters::trac::TracDatabase;
use crate::config::MigrateConfig;
use crate::error::MigrateError;
use crate::ports::exporter::IssueExporter;
use crate::ports::remote::RemoteRepo;
use crate::ports::tickets::TicketStore;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, dry run, or fakes).
pub struct ServiceContext {
    /// Source ticket store.
    pub tickets: Box<dyn TicketStore>,
    /// Destination labels, milestones and users.
    pub remote: Box<dyn RemoteRepo>,
    /// Destination issue import.
    pub exporter: Box<dyn IssueExporter>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(
        tickets: Box<dyn TicketStore>,
        remote: Box<dyn RemoteRepo>,
        exporter: Box<dyn IssueExporter>,
    ) -> Self {
        Self { tickets, remote, exporter }
    }

    /// Creates a live context: the Trac database and the GitHub API.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the HTTP client
    /// cannot be built.
    pub fn live(config: &MigrateConfig, token: &str) -> Result<Self, MigrateError> {
        let tickets = TracDatabase::open(&config.trac.database)?;
        let github = GitHubClient::new(&config.github, token)?;
        Ok(Self::new(Box::new(tickets), Box::new(github.clone()), Box::new(github)))
    }

    /// Creates a dry-run context that reads but never mutates the destination.
    ///
    /// Without a token the destination is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the HTTP client
    /// cannot be built.
    pub fn dry_run(
        config: &MigrateConfig,
        token: Option<&str>,
    ) -> Result<Self, MigrateError> {
        let tickets = TracDatabase::open(&config.trac.database)?;
        let reader = match token {
            Some(token) => Some(Arc::new(GitHubClient::new(&config.github, token)?) as Arc<dyn RemoteRepo>),
            None => None,
        };
        let dry_run = DryRun::new(reader);
        Ok(Self::new(Box::new(tickets), Box::new(dry_run.clone()), Box::new(dry_run)))
    }
}
