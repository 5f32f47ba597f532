//! Historical revision number to new commit identifier lookup.
//!
//! The source is a tab-delimited two-column table, one mapping per row:
//!
//! ```text
//! 1234<TAB>3f2a9c1e0b...
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use crate::error::MigrateError;

/// Read-only map from revision number (digits only) to new identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionMap {
    entries: HashMap<String, String>,
}

impl RevisionMap {
    /// An empty map; every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the map from a tab-delimited file.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::RevisionMap`] if the file cannot be opened or read.
    pub fn load(path: &Path) -> Result<Self, MigrateError> {
        info!("loading revision map from {}", path.display());
        let file = File::open(path)
            .map_err(|source| MigrateError::RevisionMap { path: path.to_path_buf(), source })?;
        let map = Self::from_reader(BufReader::new(file))
            .map_err(|source| MigrateError::RevisionMap { path: path.to_path_buf(), source })?;
        info!("loaded {} revision mappings", map.len());
        Ok(map)
    }

    /// Parses mappings from any buffered reader.
    ///
    /// Blank lines are ignored. Rows without a second column are skipped
    /// with a warning. A later row for the same revision replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if reading fails.
    pub fn from_reader(reader: impl BufRead) -> std::io::Result<Self> {
        let mut entries = HashMap::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            let mut columns = line.split('\t');
            match (columns.next(), columns.next()) {
                (Some(rev), Some(id)) if !rev.trim().is_empty() && !id.trim().is_empty() => {
                    entries.insert(rev.trim().to_string(), id.trim().to_string());
                }
                _ => warn!("revision map row {} is malformed, skipping: {line:?}", index + 1),
            }
        }
        Ok(Self { entries })
    }

    /// Exact-key lookup of a revision number such as `"1234"`.
    #[must_use]
    pub fn lookup(&self, revision: &str) -> Option<&str> {
        self.entries.get(revision).map(String::as_str)
    }

    /// Number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RevisionMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
