//! Adapter implementations for the port traits.
//!
//! - `trac`: reads tickets from a Trac SQLite database.
//! - `github`: talks to the GitHub REST API.
//! - `dry_run`: forwards reads, logs writes.

pub mod dry_run;
pub mod github;
pub mod trac;
