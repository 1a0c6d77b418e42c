//! Terminal rendering collaborator.
//!
//! The terminal cannot render PDFs, so pages come from text-layer dumps: one
//! JSON array of positioned fragments per page, stored as
//! `<dir>/<document stem>/page-<n>.json`. Loading a dump stands in for
//! rendering the page; highlights are tracked per fragment and painted by the
//! formatter.

use pagecite_domain::{HighlightStyle, PageView, Rect, RenderError, TextFragment, TextLayer, Viewport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Height of the simulated scroll container, in page units.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

/// One fragment of a text-layer dump, in unscaled page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    /// Fragment text
    pub text: String,
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    #[serde(default)]
    pub width: f64,
    /// Height
    #[serde(default)]
    pub height: f64,
}

/// Text layer of one page, loaded from a dump.
#[derive(Debug, Clone, Default)]
pub struct TerminalLayer {
    records: Vec<FragmentRecord>,
    highlighted: Vec<bool>,
    scale: f64,
}

impl TerminalLayer {
    /// Build a layer from fragment records at `scale`.
    pub fn from_records(records: Vec<FragmentRecord>, scale: f64) -> Self {
        let highlighted = vec![false; records.len()];
        Self {
            records,
            highlighted,
            scale,
        }
    }

    /// A layer with no fragments.
    pub fn empty() -> Self {
        Self::from_records(Vec::new(), 1.0)
    }

    /// Load a dump from `path`.
    pub fn load(path: &Path, scale: f64) -> Result<Self, RenderError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| RenderError::new(format!("Failed to read {}: {}", path.display(), e)))?;
        let records: Vec<FragmentRecord> = serde_json::from_str(&contents)
            .map_err(|e| RenderError::new(format!("Invalid text layer {}: {}", path.display(), e)))?;
        Ok(Self::from_records(records, scale))
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page has no text.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Indices of highlighted fragments.
    pub fn highlighted(&self) -> Vec<usize> {
        (0..self.highlighted.len())
            .filter(|&i| self.highlighted[i])
            .collect()
    }

    /// Visual lines intersecting the window `[top, top + height)`.
    ///
    /// Fragments sharing a top edge form one line, in dump order. Each entry
    /// pairs the fragment text with its highlight flag.
    pub fn lines_in(&self, top: f64, height: f64) -> Vec<Vec<(&str, bool)>> {
        let bottom = top + height;
        let mut lines: Vec<(f64, Vec<(&str, bool)>)> = Vec::new();

        for (index, record) in self.records.iter().enumerate() {
            let y = record.y * self.scale;
            let h = record.height * self.scale;
            if y + h < top || y >= bottom {
                continue;
            }

            let entry = (record.text.as_str(), self.highlighted[index]);
            match lines.iter_mut().find(|(line_y, _)| (*line_y - y).abs() < 0.5) {
                Some((_, line)) => line.push(entry),
                None => lines.push((y, vec![entry])),
            }
        }

        lines.sort_by(|a, b| a.0.total_cmp(&b.0));
        lines.into_iter().map(|(_, line)| line).collect()
    }
}

impl TextLayer for TerminalLayer {
    type Handle = usize;

    fn fragments(&self) -> Vec<TextFragment<usize>> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| TextFragment::new(r.text.clone(), i))
            .collect()
    }

    fn set_highlight(&mut self, handle: &usize, style: Option<&HighlightStyle>) {
        // Handles from a previous page may be out of range here
        if let Some(flag) = self.highlighted.get_mut(*handle) {
            *flag = style.is_some();
        }
    }

    fn bounds(&self, handle: &usize) -> Option<Rect> {
        self.records.get(*handle).map(|r| {
            Rect::new(
                r.x * self.scale,
                r.y * self.scale,
                r.width * self.scale,
                r.height * self.scale,
            )
        })
    }
}

/// Scroll container the page is shown through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalViewport {
    height: f64,
    scroll_top: f64,
}

impl TerminalViewport {
    /// Viewport of `height` page units, scrolled to the top.
    pub fn new(height: f64) -> Self {
        Self {
            height,
            scroll_top: 0.0,
        }
    }

    /// Height of the visible window.
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl Viewport for TerminalViewport {
    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, 0.0, self.height)
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn scroll_to(&mut self, top: f64) {
        self.scroll_top = top;
    }
}

/// Directory of text-layer dumps for a profile.
#[derive(Debug, Clone)]
pub struct LayerStore {
    root: PathBuf,
}

impl LayerStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_dir(&self, document: &str) -> PathBuf {
        let stem = Path::new(document)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| document.to_string());
        self.root.join(stem)
    }

    /// Dump path for one page.
    pub fn page_path(&self, document: &str, page: u32) -> PathBuf {
        self.document_dir(document).join(format!("page-{}.json", page))
    }

    /// Number of pages dumped for `document`, if any.
    pub fn page_count(&self, document: &str) -> Option<u32> {
        let entries = fs::read_dir(self.document_dir(document)).ok()?;
        let count = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                let name = e.file_name();
                let name = name.to_string_lossy();
                name.starts_with("page-") && name.ends_with(".json")
            })
            .count();
        u32::try_from(count).ok().filter(|&n| n > 0)
    }

    /// "Render" `view` by loading its dump.
    pub fn load(&self, view: &PageView) -> Result<TerminalLayer, RenderError> {
        TerminalLayer::load(
            &self.page_path(&view.document, view.page),
            f64::from(view.scale()),
        )
    }
}
