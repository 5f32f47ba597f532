//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `trac-migrate`.
#[derive(Debug, Parser)]
#[command(name = "trac-migrate", version, about = "Migrate Trac tickets to GitHub issues")]
pub struct Cli {
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, global = true)]
    pub debug: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export tickets in ascending id order.
    Migrate {
        /// Migration configuration file.
        #[arg(long)]
        config: PathBuf,
        /// First ticket id to migrate.
        #[arg(long, default_value_t = 1)]
        start: u64,
        /// Maximum number of tickets to migrate.
        #[arg(long)]
        limit: Option<u64>,
        /// Create labels, milestones and issues. Without this flag nothing is written.
        #[arg(long)]
        really: bool,
        /// Also write every payload as `<ticket>.json` into this directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Convert Trac wiki text to Markdown.
    Convert {
        /// Configuration providing the revision map.
        #[arg(long)]
        config: Option<PathBuf>,
        /// File to convert; standard input when omitted.
        path: Option<PathBuf>,
    },
    /// Check that every mapped GitHub login exists.
    CheckUsers {
        /// Migration configuration file.
        #[arg(long)]
        config: PathBuf,
    },
    /// Show the status of a submitted issue import.
    Status {
        /// Migration configuration file.
        #[arg(long)]
        config: PathBuf,
        /// Import id returned when the issue was submitted.
        id: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_migrate_with_defaults() {
        let cli = Cli::parse_from(["trac-migrate", "migrate", "--config", "m.yaml"]);
        assert!(!cli.debug);
        match cli.command {
            Command::Migrate { config, start, limit, really, out } => {
                assert_eq!(config.to_str(), Some("m.yaml"));
                assert_eq!(start, 1);
                assert!(limit.is_none());
                assert!(!really);
                assert!(out.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_resumed_live_run() {
        let cli = Cli::parse_from([
            "trac-migrate",
            "migrate",
            "--config",
            "m.yaml",
            "--start",
            "42",
            "--limit",
            "10",
            "--really",
            "--debug",
        ]);
        assert!(cli.debug);
        assert!(matches!(
            cli.command,
            Command::Migrate { start: 42, limit: Some(10), really: true, .. }
        ));
    }

    #[test]
    fn parses_convert_from_stdin() {
        let cli = Cli::parse_from(["trac-migrate", "convert"]);
        assert!(matches!(cli.command, Command::Convert { config: None, path: None }));
    }

    #[test]
    fn parses_status_id() {
        let cli = Cli::parse_from(["trac-migrate", "status", "--config", "m.yaml", "7"]);
        assert!(matches!(cli.command, Command::Status { id: 7, .. }));
    }

    #[test]
    fn migrate_requires_config() {
        assert!(Cli::try_parse_from(["trac-migrate", "migrate"]).is_err());
    }
}
