//! `trac-migrate convert` command.

use std::io::Read;
use std::path::Path;

use crate::config::MigrateConfig;
use crate::convert::TextConverter;
use crate::pipeline::load_converter;

/// Execute the `convert` command.
///
/// Reads `path` (or standard input) and prints the Markdown rendering. With
/// a configuration, revision references are rewritten through its map.
///
/// # Errors
///
/// Returns an error string if the configuration, revision map or input
/// cannot be read.
pub fn run(config: Option<&Path>, path: Option<&Path>) -> Result<(), String> {
    let converter = match config {
        Some(config_path) => {
            let config = MigrateConfig::load(config_path).map_err(|e| e.to_string())?;
            load_converter(&config).map_err(|e| e.to_string())?
        }
        None => TextConverter::default(),
    };
    let text = read_input(path)?;
    println!("{}", converter.convert(&text));
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("Failed to read standard input: {e}"))?;
            Ok(text)
        }
    }
}
