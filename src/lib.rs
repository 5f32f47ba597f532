//! Core library entry for the `trac-migrate` CLI.
//!
//! Tickets are read from a Trac database, their wiki text is converted to
//! Markdown, labels and milestones are reconciled against the destination,
//! and each ticket is exported as one GitHub issue with its full history.

pub mod adapters;
pub mod assemble;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod logging;
pub mod payload;
pub mod pipeline;
pub mod ports;
pub mod reconcile;
pub mod revmap;
pub mod timeline;

#[cfg(test)]
mod testing;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init(cli.debug);
    commands::dispatch(&cli.command)
}
