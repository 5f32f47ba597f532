//! Binary entrypoint for the `trac-migrate` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match trac_migrate::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
