//! Migration configuration loaded from a YAML file.
//!
//! Secrets never live in the file: the GitHub token comes from the
//! `GITHUB_TOKEN` environment variable, optionally via a `.env` file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::MigrateError;

/// Environment variable holding the GitHub API token.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Fields whose values may be surfaced as labels, in payload order.
pub const LABEL_FIELDS: [&str; 4] = ["type", "component", "priority", "resolution"];

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_CLOSED_STATUS: &str = "closed";
const DEFAULT_LABEL_COLOR: &str = "ededed";

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateConfig {
    /// Destination repository.
    pub github: GitHubConfig,
    /// Source tracker.
    pub trac: TracConfig,
    /// Tab-delimited revision map, relative to the config file.
    #[serde(default)]
    pub revmap: Option<PathBuf>,
    /// Status value that marks a ticket closed.
    #[serde(default = "default_closed_status")]
    pub closed_status: String,
    /// Color for labels configured without one.
    #[serde(default = "default_label_color")]
    pub default_label_color: String,
    /// Trac username to GitHub login.
    #[serde(default)]
    pub users: BTreeMap<String, String>,
    /// Field name to field value to label.
    #[serde(default)]
    pub labels: LabelConfig,
}

/// Destination repository settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubConfig {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

/// Source tracker settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracConfig {
    /// Path to the Trac SQLite database, relative to the config file.
    pub database: PathBuf,
    /// Prefix for attachment links; `<prefix><ticket>/<filename>`.
    #[serde(default)]
    pub attachment_url: Option<String>,
    /// Prefix for links back to the original ticket; `<prefix><ticket>`.
    #[serde(default)]
    pub ticket_url: Option<String>,
}

/// A configured label: either a bare display name or name plus color.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LabelSpec {
    /// Display name only; the default color applies.
    Name(String),
    /// Display name with an explicit color.
    Styled {
        /// Display name.
        name: String,
        /// Hex color without `#`.
        #[serde(default)]
        color: Option<String>,
    },
}

impl LabelSpec {
    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Styled { name, .. } => name,
        }
    }

    /// Configured color, if any.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        match self {
            Self::Name(_) => None,
            Self::Styled { color, .. } => color.as_deref(),
        }
    }
}

/// Label table keyed by `(field, value)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LabelConfig(BTreeMap<String, BTreeMap<String, LabelSpec>>);

impl LabelConfig {
    /// The label configured for `field = value`, if any.
    #[must_use]
    pub fn get(&self, field: &str, value: &str) -> Option<&LabelSpec> {
        self.0.get(field).and_then(|values| values.get(value))
    }

    /// Adds or replaces one entry.
    pub fn insert(&mut self, field: &str, value: &str, spec: LabelSpec) {
        self.0.entry(field.to_string()).or_default().insert(value.to_string(), spec);
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_closed_status() -> String {
    DEFAULT_CLOSED_STATUS.to_string()
}

fn default_label_color() -> String {
    DEFAULT_LABEL_COLOR.to_string()
}

impl MigrateConfig {
    /// Reads and parses the configuration file.
    ///
    /// Relative `revmap` and `trac.database` paths are resolved against the
    /// directory holding the file.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, MigrateError> {
        let contents = std::fs::read_to_string(path).map_err(|e| MigrateError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config = Self::parse(&contents).map_err(|message| MigrateError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        if let Some(base) = path.parent() {
            config.trac.database = base.join(&config.trac.database);
            config.revmap = config.revmap.map(|revmap| base.join(revmap));
        }
        Ok(config)
    }

    /// Parses configuration YAML.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the YAML is invalid.
    pub fn parse(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())
    }

    /// GitHub login for a Trac user, if mapped.
    #[must_use]
    pub fn github_login(&self, trac_user: &str) -> Option<&str> {
        self.users.get(trac_user).map(String::as_str)
    }
}

/// Reads the GitHub token, loading `.env` first if present.
///
/// # Errors
///
/// Returns [`MigrateError::MissingSetting`] if the variable is unset or empty.
pub fn github_token() -> Result<String, MigrateError> {
    optional_github_token().ok_or_else(|| MigrateError::MissingSetting(TOKEN_VAR.to_string()))
}

/// Reads the GitHub token if one is available.
#[must_use]
pub fn optional_github_token() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var(TOKEN_VAR).ok().filter(|token| !token.trim().is_empty())
}
