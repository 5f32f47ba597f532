//! Issue exporter port: hands assembled payloads to the destination.

use serde::{Deserialize, Serialize};

use crate::error::PortError;
use crate::payload::ExportPayload;

/// What the destination reports for a submitted import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReceipt {
    /// Import request id.
    pub id: u64,
    /// Import status (`pending`, `imported`, `failed`).
    pub status: String,
    /// URL for polling the import.
    pub url: String,
}

/// Creates issues on the destination.
///
/// Abstracting the export call keeps the pipeline testable with a fake
/// that records payloads instead of talking to a real service.
pub trait IssueExporter: Send + Sync {
    /// Submits one issue with its comments.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination rejects the payload or is unreachable.
    fn export(
        &self,
        payload: &ExportPayload,
    ) -> Result<ImportReceipt, PortError>;

    /// Fetches the current status of a previously submitted import.
    ///
    /// # Errors
    ///
    /// Returns an error if the import cannot be found or the request fails.
    fn import_status(
        &self,
        id: u64,
    ) -> Result<ImportReceipt, PortError>;
}
