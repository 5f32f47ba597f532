//! Dry-run adapter: reads the destination but never changes it.
//!
//! Listings and user lookups are forwarded to an optional reader, so a dry
//! run with a token sees the real labels and milestones. Creations and
//! exports are logged and answered with local handles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::error::PortError;
use crate::payload::ExportPayload;
use crate::ports::exporter::{ImportReceipt, IssueExporter};
use crate::ports::remote::{LabelHandle, MilestoneHandle, NewMilestone, RemoteRepo};

/// Remote and exporter ports that record intent instead of mutating.
#[derive(Clone)]
pub struct DryRun {
    inner: Arc<Inner>,
}

struct Inner {
    reader: Option<Arc<dyn RemoteRepo>>,
    last_milestone: AtomicU64,
    last_import: AtomicU64,
}

impl DryRun {
    /// Creates a dry run; without `reader` the destination looks empty.
    #[must_use]
    pub fn new(reader: Option<Arc<dyn RemoteRepo>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                reader,
                last_milestone: AtomicU64::new(0),
                last_import: AtomicU64::new(0),
            }),
        }
    }
}

impl RemoteRepo for DryRun {
    fn list_labels(&self) -> Result<Vec<LabelHandle>, PortError> {
        match &self.inner.reader {
            Some(reader) => reader.list_labels(),
            None => Ok(Vec::new()),
        }
    }

    fn create_label(&self, name: &str, color: &str) -> Result<LabelHandle, PortError> {
        info!("dry run: would create label {name:?} with color {color}");
        Ok(LabelHandle { name: name.to_string(), color: color.to_string() })
    }

    fn list_milestones(&self) -> Result<Vec<MilestoneHandle>, PortError> {
        let milestones = match &self.inner.reader {
            Some(reader) => reader.list_milestones()?,
            None => Vec::new(),
        };
        // Invented numbers continue after the highest real one.
        if let Some(max) = milestones.iter().map(|m| m.number).max() {
            self.inner.last_milestone.fetch_max(max, Ordering::SeqCst);
        }
        Ok(milestones)
    }

    fn create_milestone(&self, milestone: &NewMilestone) -> Result<MilestoneHandle, PortError> {
        let number = self.inner.last_milestone.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "dry run: would create {} milestone {:?} as #{number}",
            milestone.state.as_str(),
            milestone.title
        );
        Ok(MilestoneHandle { number, title: milestone.title.clone(), state: milestone.state })
    }

    fn user_exists(&self, login: &str) -> Result<bool, PortError> {
        match &self.inner.reader {
            Some(reader) => reader.user_exists(login),
            None => Ok(true),
        }
    }
}

impl IssueExporter for DryRun {
    fn export(&self, payload: &ExportPayload) -> Result<ImportReceipt, PortError> {
        let id = self.inner.last_import.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "dry run: would import {:?} with {} comments",
            payload.issue.title,
            payload.comments.len()
        );
        Ok(ImportReceipt { id, status: "dry-run".to_string(), url: String::new() })
    }

    fn import_status(&self, id: u64) -> Result<ImportReceipt, PortError> {
        Err(format!("import {id} was never submitted (dry run)").into())
    }
}
