//! pagecite Rust SDK
//!
//! Client library for the document chat backend: the server-sent answer
//! stream, PDF upload, session reset and PDF download.
//!
//! # Example
//!
//! ```no_run
//! use pagecite_domain::Conversation;
//! use pagecite_sdk::PageciteClient;
//!
//! # async fn demo() -> Result<(), pagecite_sdk::SdkError> {
//! let client = PageciteClient::new("http://localhost:8000")?;
//! let mut conversation = Conversation::new();
//!
//! conversation.submit("What is the termination clause?");
//! let mut stream = client.open_stream("What is the termination clause?").await?;
//! while let Some(event) = stream.next_event().await {
//!     match event {
//!         Ok(event) => {
//!             conversation.apply(event);
//!         }
//!         Err(e) if e.ends_stream() => {
//!             conversation.on_transport_error();
//!         }
//!         Err(_) => continue,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod stream;
mod wire;

pub use client::{
    ClientConfig, PageciteClient, DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_STREAM_IDLE_TIMEOUT_SECS,
};
pub use error::SdkError;
pub use stream::{decode_event, ChatStream};
pub use wire::{CitationPayload, HealthResponse, ToolPayload, UploadReceipt};
