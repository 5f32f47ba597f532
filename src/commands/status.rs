//! `trac-migrate status` command.

use std::path::Path;

use crate::adapters::github::GitHubClient;
use crate::config::{github_token, MigrateConfig};
use crate::ports::exporter::IssueExporter;

/// Execute the `status` command.
///
/// # Errors
///
/// Returns an error string if the token is missing or the import cannot be fetched.
pub fn run(config_path: &Path, id: u64) -> Result<(), String> {
    let config = MigrateConfig::load(config_path).map_err(|e| e.to_string())?;
    let token = github_token().map_err(|e| e.to_string())?;
    let github = GitHubClient::new(&config.github, &token).map_err(|e| e.to_string())?;
    run_with_exporter(&github, id)
}

/// Execute the `status` command against an explicit exporter.
///
/// # Errors
///
/// Returns an error string if the import cannot be fetched.
pub fn run_with_exporter(exporter: &dyn IssueExporter, id: u64) -> Result<(), String> {
    let receipt =
        exporter.import_status(id).map_err(|e| format!("Failed to fetch import {id}: {e}"))?;
    println!("Import {}: {}", receipt.id, receipt.status);
    if !receipt.url.is_empty() {
        println!("{}", receipt.url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRemote;

    #[test]
    fn unknown_import_is_an_error() {
        let remote = FakeRemote::default();
        let err = run_with_exporter(&remote, 9).unwrap_err();
        assert!(err.contains("Failed to fetch import 9"));
    }
}
