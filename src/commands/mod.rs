//! Command dispatch and handlers.

pub mod convert;
pub mod migrate;
pub mod status;
pub mod users;

use crate::cli::Command;
use crate::pipeline::RunOptions;
use crate::ports::tickets::TicketQuery;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Migrate { config, start, limit, really, out } => {
            let options = RunOptions {
                query: TicketQuery { start: *start, limit: *limit },
                out_dir: out.clone(),
            };
            migrate::run(config, &options, *really)
        }
        Command::Convert { config, path } => convert::run(config.as_deref(), path.as_deref()),
        Command::CheckUsers { config } => users::run(config),
        Command::Status { config, id } => status::run(config, *id),
    }
}
