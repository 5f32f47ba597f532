//! `trac-migrate migrate` command.

use std::path::Path;

use tracing::info;

use crate::config::{github_token, optional_github_token, MigrateConfig};
use crate::context::ServiceContext;
use crate::convert::TextConverter;
use crate::pipeline::{load_converter, validate_users, Migration, RunOptions};

/// Execute the `migrate` command.
///
/// Without `really` the destination is only read; labels, milestones and
/// issues are logged instead of created.
///
/// # Errors
///
/// Returns an error string if setup fails or the run halts on a ticket.
pub fn run(config_path: &Path, options: &RunOptions, really: bool) -> Result<(), String> {
    let config = MigrateConfig::load(config_path).map_err(|e| e.to_string())?;
    let converter = load_converter(&config).map_err(|e| e.to_string())?;
    info!("loaded {} revision mappings", converter.revisions().len());

    let ctx = if really {
        let token = github_token().map_err(|e| e.to_string())?;
        ServiceContext::live(&config, &token).map_err(|e| e.to_string())?
    } else {
        info!("dry run, nothing will be created; pass --really to migrate");
        ServiceContext::dry_run(&config, optional_github_token().as_deref())
            .map_err(|e| e.to_string())?
    };
    run_with_context(&ctx, &config, &converter, options)
}

/// Execute the `migrate` command against an explicit context.
///
/// # Errors
///
/// Returns an error string if a mapped user is missing, the destination
/// cannot be enumerated, or the run halts on a ticket.
pub fn run_with_context(
    ctx: &ServiceContext,
    config: &MigrateConfig,
    converter: &TextConverter,
    options: &RunOptions,
) -> Result<(), String> {
    validate_users(ctx.remote.as_ref(), config).map_err(|e| e.to_string())?;
    let mut migration = Migration::start(ctx, config, converter).map_err(|e| e.to_string())?;
    let report = migration.run(options).map_err(|e| e.to_string())?;

    match report.last_ticket {
        Some(last) => println!(
            "Exported {} tickets through #{last}; next run starts at {}.",
            report.exported,
            last + 1
        ),
        None => println!("No tickets to migrate."),
    }
    println!("{} labels, {} milestones known.", report.labels, report.milestones);
    Ok(())
}
