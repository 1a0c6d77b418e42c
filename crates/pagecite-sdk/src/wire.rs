//! Wire payloads exchanged with the chat backend.

use pagecite_domain::{Citation, ToolEvent};
use serde::{Deserialize, Serialize};

/// Payload of a `tool` event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolPayload {
    /// Tool name
    pub name: String,
    /// Progress message
    #[serde(default)]
    pub message: String,
}

/// Payload of a `citation` event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CitationPayload {
    /// Marker number
    pub id: u32,
    /// Document file name
    pub document: String,
    /// 1-based page
    pub page: u32,
    /// Cited passage
    #[serde(default)]
    pub snippet: String,
}

/// Health check response
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Reported status (`ok` when healthy)
    pub status: String,
}

impl HealthResponse {
    /// Whether the server reported itself healthy
    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// File name sent to the server
    pub filename: String,
    /// Bytes uploaded
    pub bytes: u64,
}

impl From<ToolPayload> for ToolEvent {
    fn from(p: ToolPayload) -> Self {
        ToolEvent::new(p.name, p.message)
    }
}

impl From<CitationPayload> for Citation {
    fn from(p: CitationPayload) -> Self {
        Citation::new(p.id, p.document, p.page, p.snippet)
    }
}
