//! `trac-migrate check-users` command.

use std::path::Path;

use crate::adapters::github::GitHubClient;
use crate::config::{github_token, MigrateConfig};
use crate::pipeline::validate_users;
use crate::ports::remote::RemoteRepo;

/// Execute the `check-users` command.
///
/// # Errors
///
/// Returns an error string if the token is missing or a mapped login does
/// not exist.
pub fn run(config_path: &Path) -> Result<(), String> {
    let config = MigrateConfig::load(config_path).map_err(|e| e.to_string())?;
    let token = github_token().map_err(|e| e.to_string())?;
    let github = GitHubClient::new(&config.github, &token).map_err(|e| e.to_string())?;
    run_with_remote(&github, &config)
}

/// Execute the `check-users` command against an explicit remote.
///
/// # Errors
///
/// Returns an error string if a mapped login does not exist or a lookup fails.
pub fn run_with_remote(remote: &dyn RemoteRepo, config: &MigrateConfig) -> Result<(), String> {
    if config.users.is_empty() {
        println!("No user mappings configured.");
        return Ok(());
    }
    validate_users(remote, config).map_err(|e| e.to_string())?;
    println!("All {} mapped GitHub users exist.", config.users.len());
    Ok(())
}
