//! Viewer navigation state - which page of which document is on screen

use crate::citation::Citation;

/// Smallest zoom, in percent
pub const MIN_ZOOM: u16 = 50;

/// Largest zoom, in percent
pub const MAX_ZOOM: u16 = 200;

/// Zoom change per step, in percent
pub const ZOOM_STEP: u16 = 10;

/// Zoom used when nothing else is configured
pub const DEFAULT_ZOOM: u16 = 100;

/// Identifies one rendering of one page
///
/// A text layer is only valid for the view it was rendered for; changing the
/// page or the zoom invalidates fragment geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageView {
    /// Document identifier
    pub document: String,
    /// 1-based page number
    pub page: u32,
    /// Zoom in percent
    pub zoom: u16,
}

impl PageView {
    /// Create a new page view
    pub fn new(document: impl Into<String>, page: u32, zoom: u16) -> Self {
        Self {
            document: document.into(),
            page,
            zoom,
        }
    }

    /// Render scale factor (1.0 = 100%)
    pub fn scale(&self) -> f32 {
        f32::from(self.zoom) / 100.0
    }
}

/// The citation the user opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    /// Document identifier
    pub document: String,
    /// Page the citation points at
    pub page: u32,
    /// Snippet to highlight
    pub snippet: String,
}

/// Open document, current page and zoom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerState {
    selection: Option<PageSelection>,
    current_page: u32,
    total_pages: Option<u32>,
    zoom: u16,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM)
    }
}

impl ViewerState {
    /// Create a closed viewer with the given zoom (clamped to the valid range)
    pub fn new(zoom: u16) -> Self {
        Self {
            selection: None,
            current_page: 1,
            total_pages: None,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// The open citation, if any
    pub fn selection(&self) -> Option<&PageSelection> {
        self.selection.as_ref()
    }

    /// Page on screen
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Page count, once the document has loaded
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Zoom in percent
    pub fn zoom(&self) -> u16 {
        self.zoom
    }

    /// Open the document of `citation` at its page
    ///
    /// The page count is forgotten when the document changes, since it belongs
    /// to the previous document.
    pub fn open_citation(&mut self, citation: &Citation) {
        let same_document = self
            .selection
            .as_ref()
            .is_some_and(|s| s.document == citation.document);
        if !same_document {
            self.total_pages = None;
        }

        self.current_page = citation.page.max(1);
        self.selection = Some(PageSelection {
            document: citation.document.clone(),
            page: citation.page,
            snippet: citation.snippet.clone(),
        });
        self.clamp_page();
    }

    /// Close the viewer
    pub fn close(&mut self) {
        self.selection = None;
    }

    /// Forget the selection and all page state
    pub fn reset(&mut self) {
        self.selection = None;
        self.current_page = 1;
        self.total_pages = None;
    }

    /// Record the document's page count and keep the current page inside it
    pub fn on_document_loaded(&mut self, total_pages: u32) {
        self.total_pages = Some(total_pages.max(1));
        self.clamp_page();
    }

    /// Move one page forward; returns whether the page changed
    pub fn next_page(&mut self) -> bool {
        self.go_to(self.current_page.saturating_add(1))
    }

    /// Move one page back; returns whether the page changed
    pub fn prev_page(&mut self) -> bool {
        self.go_to(self.current_page.saturating_sub(1))
    }

    /// Jump to `page`, clamped to the document; returns whether it changed
    pub fn go_to(&mut self, page: u32) -> bool {
        let before = self.current_page;
        self.current_page = page.max(1);
        self.clamp_page();
        self.current_page != before
    }

    /// Zoom in one step; returns whether the zoom changed
    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_add(ZOOM_STEP))
    }

    /// Zoom out one step; returns whether the zoom changed
    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_sub(ZOOM_STEP))
    }

    /// Render scale factor for the current zoom
    pub fn scale(&self) -> f32 {
        f32::from(self.zoom) / 100.0
    }

    /// The view on screen, if a document is open
    pub fn view(&self) -> Option<PageView> {
        self.selection
            .as_ref()
            .map(|s| PageView::new(s.document.clone(), self.current_page, self.zoom))
    }

    /// Snippet to highlight on the current page
    ///
    /// The snippet belongs to the cited page only; after paging away there is
    /// nothing to highlight.
    pub fn active_snippet(&self) -> Option<&str> {
        self.selection
            .as_ref()
            .filter(|s| s.page == self.current_page)
            .map(|s| s.snippet.as_str())
    }

    fn set_zoom(&mut self, zoom: u16) -> bool {
        let before = self.zoom;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom != before
    }

    fn clamp_page(&mut self) {
        if let Some(total) = self.total_pages {
            self.current_page = self.current_page.min(total);
        }
    }
}
