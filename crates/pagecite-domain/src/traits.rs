//! Trait definitions for the rendering collaborator
//!
//! The page-rendering engine is not part of pagecite. These traits describe
//! the little the locator needs from it: the ordered fragments of the page on
//! screen, a way to restyle a fragment, its bounds, and the scroll container.

use crate::fragment::{HighlightStyle, Rect, TextFragment};
use crate::viewer::PageView;
use std::fmt;

/// Text layer of the page currently on screen
pub trait TextLayer {
    /// Handle the collaborator uses to address one fragment
    type Handle: Clone;

    /// Fragments in page (reading) order
    fn fragments(&self) -> Vec<TextFragment<Self::Handle>>;

    /// Apply `style`, or restore the fragment's own style when `None`
    fn set_highlight(&mut self, handle: &Self::Handle, style: Option<&HighlightStyle>);

    /// Current bounds of a fragment, in the same coordinates as the viewport
    fn bounds(&self, handle: &Self::Handle) -> Option<Rect>;
}

/// The scrolling container the page is rendered into
pub trait Viewport {
    /// Visible area of the container
    fn bounds(&self) -> Rect;

    /// Current vertical scroll offset
    fn scroll_top(&self) -> f64;

    /// Start scrolling to `top`; animation is not awaited
    fn scroll_to(&mut self, top: f64);
}

/// Error reported by the rendering collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    /// Collaborator message
    pub message: String,
}

impl RenderError {
    /// Create a new render error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Whether this is the collaborator cancelling stale work after a page or
    /// zoom change, which is expected and not worth reporting
    pub fn is_cancellation(&self) -> bool {
        const NOISE: [&str; 3] = [
            "AbortException",
            "TextLayer task cancelled",
            "Rendering cancelled",
        ];
        NOISE.iter().any(|n| self.message.contains(n))
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RenderError {}

/// Render progress of the text layer, as signalled by the collaborator
///
/// `Rendered` only means the page is painted; the locator must wait for
/// `Ready` on the exact view it is about to search.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TextLayerStatus {
    /// Nothing rendered yet
    #[default]
    Pending,
    /// Page painted, text layer not finished
    Rendered(PageView),
    /// Text layer finished for this view
    Ready(PageView),
    /// Rendering this view failed
    Failed(PageView, RenderError),
}

impl TextLayerStatus {
    /// Whether the text layer is ready for `view`
    pub fn is_ready_for(&self, view: &PageView) -> bool {
        matches!(self, TextLayerStatus::Ready(v) if v == view)
    }

    /// Whether rendering `view` failed
    pub fn failure_for(&self, view: &PageView) -> Option<&RenderError> {
        match self {
            TextLayerStatus::Failed(v, e) if v == view => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_messages() {
        assert!(RenderError::new("AbortException: TextLayer task cancelled.").is_cancellation());
        assert!(RenderError::new("Rendering cancelled, page 3").is_cancellation());
        assert!(!RenderError::new("Invalid PDF structure").is_cancellation());
    }

    #[test]
    fn test_ready_is_view_specific() {
        let view = PageView::new("a.pdf", 2, 100);
        let other_zoom = PageView::new("a.pdf", 2, 110);

        let status = TextLayerStatus::Ready(view.clone());
        assert!(status.is_ready_for(&view));
        assert!(!status.is_ready_for(&other_zoom));
        assert!(!TextLayerStatus::Rendered(view.clone()).is_ready_for(&view));
    }
}
