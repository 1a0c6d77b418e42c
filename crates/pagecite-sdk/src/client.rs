//! pagecite client implementation.

use crate::error::SdkError;
use crate::stream::ChatStream;
use crate::wire::{HealthResponse, UploadReceipt};
use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default chat backend endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Default timeout for plain (non-streaming) requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default silence allowed on an answer stream before it is treated as dropped
pub const DEFAULT_STREAM_IDLE_TIMEOUT_SECS: u64 = 300;

/// Client tuning
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for health, upload, reset and PDF downloads
    pub request_timeout: Duration,
    /// Maximum silence between two stream events
    pub stream_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            stream_idle_timeout: Duration::from_secs(DEFAULT_STREAM_IDLE_TIMEOUT_SECS),
        }
    }
}

/// HTTP client for the document chat backend
#[derive(Debug, Clone)]
pub struct PageciteClient {
    base_url: Url,
    http: reqwest::Client,
    config: ClientConfig,
}

impl PageciteClient {
    /// Create a client for `base_url` with default settings
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Self::with_config(base_url, ClientConfig::default())
    }

    /// Create a client with explicit settings
    pub fn with_config(base_url: &str, config: ClientConfig) -> Result<Self, SdkError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SdkError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SdkError::InvalidUrl(base_url.to_string()));
        }

        // No overall timeout: it would cut long answer streams short
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url,
            http,
            config,
        })
    }

    /// Server base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check server health
    pub async fn health(&self) -> Result<HealthResponse, SdkError> {
        let url = self.endpoint(&["health"])?;
        let response = self
            .http
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Open the answer stream for `query`
    ///
    /// The query is sent as-is; rejecting blank queries is up to the caller.
    pub async fn open_stream(&self, query: &str) -> Result<ChatStream, SdkError> {
        let mut url = self.endpoint(&["chat", "stream"])?;
        url.query_pairs_mut().append_pair("query", query);

        info!("Opening answer stream");
        debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = ensure_success(response).await?;

        Ok(ChatStream::from_response(
            response,
            self.config.stream_idle_timeout,
        ))
    }

    /// Upload one PDF file
    pub async fn upload_pdf(&self, path: &Path) -> Result<UploadReceipt, SdkError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SdkError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Not a file path: {}", path.display()),
                ))
            })?
            .to_string();

        let data = tokio::fs::read(path).await?;
        let bytes = data.len() as u64;

        let part = Part::bytes(data)
            .file_name(filename.clone())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let url = self.endpoint(&["upload", "pdf"])?;
        info!(%filename, bytes, "Uploading PDF");

        let response = self
            .http
            .post(url)
            .multipart(form)
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        ensure_success(response).await?;

        Ok(UploadReceipt { filename, bytes })
    }

    /// Remove every uploaded document from the server
    pub async fn reset(&self) -> Result<(), SdkError> {
        let url = self.endpoint(&["reset"])?;
        let response = self
            .http
            .post(url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        ensure_success(response).await?;
        info!("Server session reset");
        Ok(())
    }

    /// URL the rendering collaborator loads `document` from
    pub fn pdf_url(&self, document: &str) -> Result<Url, SdkError> {
        self.endpoint(&["pdf", document])
    }

    /// Download the bytes of `document`
    pub async fn fetch_pdf(&self, document: &str) -> Result<Bytes, SdkError> {
        let url = self.pdf_url(document)?;
        let response = self
            .http
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SdkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SdkError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SdkError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(SdkError::ServerError(format!("HTTP {}: {}", status, error_text)))
}
