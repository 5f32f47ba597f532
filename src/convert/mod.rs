//! Trac wiki markup to GitHub Markdown.
//!
//! Conversion is a fixed chain of [`Rule`]s applied left to right. Order
//! matters: italic must see the text after bold has consumed triple quotes,
//! and revision rewriting runs on trimmed text.

pub mod rules;

use std::borrow::Cow;

use tracing::debug;

pub use rules::Rule;

use crate::revmap::RevisionMap;

/// Converts Trac wiki text to Markdown, rewriting revision references.
#[derive(Debug, Clone, Default)]
pub struct TextConverter {
    revisions: RevisionMap,
}

impl TextConverter {
    /// Creates a converter that rewrites revisions through `revisions`.
    #[must_use]
    pub fn new(revisions: RevisionMap) -> Self {
        Self { revisions }
    }

    /// The revision map consulted by the revision rules.
    #[must_use]
    pub fn revisions(&self) -> &RevisionMap {
        &self.revisions
    }

    /// Converts `text`. Never fails; empty input yields empty output.
    #[must_use]
    pub fn convert(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in Rule::ALL {
            let next = match rule.apply(&current, &self.revisions) {
                Cow::Owned(rewritten) => rewritten,
                Cow::Borrowed(slice) if slice.len() != current.len() => slice.to_string(),
                Cow::Borrowed(_) => continue,
            };
            debug!(rule = rule.name(), "rewrote text");
            current = next;
        }
        current
    }

    /// Converts optional text, treating `None` as empty.
    #[must_use]
    pub fn convert_opt(&self, text: Option<&str>) -> String {
        text.map(|t| self.convert(t)).unwrap_or_default()
    }
}
