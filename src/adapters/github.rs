//! Live adapter for the remote and exporter ports using the GitHub REST API.
//!
//! Calls are made with an async `reqwest` client driven by a private
//! current-thread runtime, so every port method blocks until its request
//! completes. Issues go through the issue import endpoint, which accepts
//! an issue together with all of its comments and original timestamps.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::config::GitHubConfig;
use crate::error::{MigrateError, PortError};
use crate::payload::ExportPayload;
use crate::ports::exporter::{ImportReceipt, IssueExporter};
use crate::ports::remote::{LabelHandle, MilestoneHandle, NewMilestone, RemoteRepo};

const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_IMPORT: &str = "application/vnd.github.golden-comet-preview+json";
const USER_AGENT: &str = concat!("trac-migrate/", env!("CARGO_PKG_VERSION"));
const PAGE_SIZE: usize = 100;

/// GitHub client for one repository. Clones share the connection pool.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<Inner>,
}

struct Inner {
    runtime: Runtime,
    client: Client,
    repo_url: String,
    api_url: String,
    token: String,
}

/// Error body returned by the GitHub API.
#[derive(Deserialize)]
struct GitHubError {
    message: String,
}

#[derive(Serialize)]
struct NewLabel<'a> {
    name: &'a str,
    color: &'a str,
}

impl GitHubClient {
    /// Creates a client for `config.owner/config.repo` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Client`] if the runtime or HTTP client cannot be built.
    pub fn new(config: &GitHubConfig, token: &str) -> Result<Self, MigrateError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| MigrateError::Client(e.into()))?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MigrateError::Client(e.into()))?;
        let api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(Self {
            inner: Arc::new(Inner {
                runtime,
                client,
                repo_url: format!("{api_url}/repos/{}/{}", config.owner, config.repo),
                api_url,
                token: token.to_string(),
            }),
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.repo_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.request_as(method, url, ACCEPT_JSON)
    }

    fn request_as(&self, method: Method, url: &str, accept: &'static str) -> RequestBuilder {
        debug!("{method} {url}");
        self.inner
            .client
            .request(method, url)
            .bearer_auth(&self.inner.token)
            .header(reqwest::header::ACCEPT, accept)
    }

    async fn send(request: RequestBuilder) -> Result<(StatusCode, String), PortError> {
        let response = request
            .send()
            .await
            .map_err(|e| -> PortError { format!("GitHub API request failed: {e}").into() })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| -> PortError { format!("Failed to read GitHub API response: {e}").into() })?;
        Ok((status, text))
    }

    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, PortError> {
        let (status, text) = Self::send(request).await?;
        decode(status, &text)
    }

    async fn list_all<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, PortError> {
        let separator = if url.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        for page in 1u32.. {
            let page_url = format!("{url}{separator}per_page={PAGE_SIZE}&page={page}");
            let batch: Vec<T> = Self::fetch(self.request(Method::GET, &page_url)).await?;
            let last = batch.len() < PAGE_SIZE;
            items.extend(batch);
            if last {
                break;
            }
        }
        Ok(items)
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, PortError> {
    if !status.is_success() {
        return Err(error_message(status, text).into());
    }
    serde_json::from_str(text)
        .map_err(|e| format!("Failed to parse GitHub API response: {e}").into())
}

fn error_message(status: StatusCode, text: &str) -> String {
    let msg = serde_json::from_str::<GitHubError>(text).map_or_else(|_| text.to_string(), |e| e.message);
    format!("GitHub API error ({}): {msg}", status.as_u16())
}

impl RemoteRepo for GitHubClient {
    fn list_labels(&self) -> Result<Vec<LabelHandle>, PortError> {
        self.inner.runtime.block_on(self.list_all(&self.repo_url("labels")))
    }

    fn create_label(&self, name: &str, color: &str) -> Result<LabelHandle, PortError> {
        let request = self.request(Method::POST, &self.repo_url("labels")).json(&NewLabel { name, color });
        self.inner.runtime.block_on(Self::fetch(request))
    }

    fn list_milestones(&self) -> Result<Vec<MilestoneHandle>, PortError> {
        self.inner.runtime.block_on(self.list_all(&self.repo_url("milestones?state=all")))
    }

    fn create_milestone(&self, milestone: &NewMilestone) -> Result<MilestoneHandle, PortError> {
        let request = self.request(Method::POST, &self.repo_url("milestones")).json(milestone);
        self.inner.runtime.block_on(Self::fetch(request))
    }

    fn user_exists(&self, login: &str) -> Result<bool, PortError> {
        let url = format!("{}/users/{login}", self.inner.api_url);
        let (status, text) = self.inner.runtime.block_on(Self::send(self.request(Method::GET, &url)))?;
        match status {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(error_message(s, &text).into()),
        }
    }
}

impl IssueExporter for GitHubClient {
    fn export(&self, payload: &ExportPayload) -> Result<ImportReceipt, PortError> {
        let request = self
            .request_as(Method::POST, &self.repo_url("import/issues"), ACCEPT_IMPORT)
            .json(payload);
        self.inner.runtime.block_on(Self::fetch(request))
    }

    fn import_status(&self, id: u64) -> Result<ImportReceipt, PortError> {
        let url = self.repo_url(&format!("import/issues/{id}"));
        let request = self.request_as(Method::GET, &url, ACCEPT_IMPORT);
        self.inner.runtime.block_on(Self::fetch(request))
    }
}
