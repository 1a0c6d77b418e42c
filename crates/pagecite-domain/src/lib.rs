//! pagecite Domain Layer
//!
//! This crate contains the core logic of the pagecite document chat client.
//! It performs no I/O: networking lives in `pagecite-sdk`, timing and readiness
//! waits live in `pagecite-session`, and rendering is supplied by whoever
//! implements the collaborator traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Conversation**: the transcript plus the stream reconciler that turns
//!   snapshot-style text events into append-only deltas
//! - **Citation**: a reference from an answer marker `[n]` to a passage on a page
//! - **Snippet Locator**: finds a citation snippet inside a page's rendered text
//!   fragments and keeps exactly one highlight generation alive
//! - **Viewer state**: which document/page/zoom is on screen
//!
//! ## Architecture
//!
//! - Pure logic only, usable from any front-end
//! - Collaborator traits for the rendering engine (`TextLayer`, `Viewport`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod citation;
pub mod conversation;
pub mod fragment;
pub mod locator;
pub mod markers;
pub mod traits;
pub mod transcript;
pub mod turn;
pub mod viewer;

// Re-exports for convenience
pub use citation::Citation;
pub use conversation::{snapshot_delta, Applied, Conversation, StreamEvent};
pub use fragment::{HighlightStyle, Rect, TextFragment};
pub use locator::{MatchResult, MatchTier, SnippetLocator};
pub use markers::Segment;
pub use traits::{RenderError, TextLayer, TextLayerStatus, Viewport};
pub use transcript::Transcript;
pub use turn::{ChatTurn, Role, ToolEvent};
pub use viewer::{PageSelection, PageView, ViewerState};
