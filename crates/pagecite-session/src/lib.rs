//! pagecite Session
//!
//! Async glue between the SDK and the domain layer.
//!
//! # Overview
//!
//! - [`ChatSession`] owns the conversation and at most one live answer stream.
//!   Submitting a new query drops the previous stream before opening the next.
//! - [`HighlightDriver`] runs the snippet locator once the rendering
//!   collaborator reports that the text layer of the requested view is ready,
//!   after a short settling delay, and gives up after a bounded wait.
//!
//! Both run on whatever task drives them; neither spawns work of its own.

#![warn(missing_docs)]

pub mod chat;
pub mod highlight;

pub use chat::ChatSession;
pub use highlight::{HighlightDriver, HighlightOutcome, HighlightTiming};

use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Backend request failed
    #[error(transparent)]
    Sdk(#[from] pagecite_sdk::SdkError),

    /// The latest answer has no citation with this id
    #[error("No citation [{0}] in the latest answer")]
    NoSuchCitation(u32),
}
