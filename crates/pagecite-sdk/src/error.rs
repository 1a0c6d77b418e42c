//! Error types for the pagecite SDK.

use std::time::Duration;
use thiserror::Error;

/// SDK operation errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// Connection error (network, DNS, refused)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Server answered with a non-success status
    #[error("Server error: {0}")]
    ServerError(String),

    /// The answer stream broke or ended without a `done` event
    #[error("Stream error: {0}")]
    StreamError(String),

    /// The answer stream stayed silent for too long
    #[error("Stream idle for {0:?}")]
    IdleTimeout(Duration),

    /// One stream event carried a payload that could not be decoded
    #[error("Malformed '{event}' event: {message}")]
    DecodeError {
        /// SSE event name
        event: String,
        /// Parser message
        message: String,
    },

    /// Server base URL or path could not be formed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Local file error (upload source)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SdkError {
    /// Whether this error ends the answer stream
    ///
    /// Decode errors affect a single event; the stream carries on after them.
    pub fn ends_stream(&self) -> bool {
        !matches!(self, SdkError::DecodeError { .. })
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            SdkError::ConnectionError(e.to_string())
        } else if e.is_timeout() {
            SdkError::ConnectionError(format!("Request timeout: {}", e))
        } else if e.is_status() {
            match e.status() {
                Some(status) if status.is_server_error() => {
                    SdkError::ServerError(format!("HTTP {}", status))
                }
                Some(status) => SdkError::ServerError(format!("HTTP {}: {}", status, e)),
                None => SdkError::ServerError(e.to_string()),
            }
        } else if e.is_body() || e.is_decode() {
            SdkError::StreamError(e.to_string())
        } else {
            SdkError::ConnectionError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_errors_do_not_end_stream() {
        let decode = SdkError::DecodeError {
            event: "citation".to_string(),
            message: "expected value".to_string(),
        };
        assert!(!decode.ends_stream());
        assert!(SdkError::StreamError("reset".to_string()).ends_stream());
        assert!(SdkError::IdleTimeout(Duration::from_secs(1)).ends_stream());
    }

    #[test]
    fn test_display() {
        let e = SdkError::DecodeError {
            event: "tool".to_string(),
            message: "missing field `name`".to_string(),
        };
        assert_eq!(e.to_string(), "Malformed 'tool' event: missing field `name`");
    }
}
