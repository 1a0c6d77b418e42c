//! Snippet locator
//!
//! Finds a citation snippet among the text fragments of the rendered page and
//! highlights the fragments it covers. The snippet was extracted from the PDF
//! long before the page was rendered, so whitespace, fragment boundaries and
//! the occasional character disagree; matching therefore runs on one
//! normalized string built from all fragments, and the match is mapped back to
//! fragments by offset.
//!
//! # Matching tiers
//!
//! | Tier | Searched for | Used when |
//! |------|--------------|-----------|
//! | `Exact` | whole normalized snippet | always tried first |
//! | `Prefix50` | first 50 characters | snippet longer than 50 characters |
//! | `Prefix30` | first 30 characters | snippet longer than 30 characters |
//!
//! Whatever tier matches, the highlighted range spans the full snippet length
//! from the match start, so a partial match errs on highlighting too much.

use crate::fragment::{HighlightStyle, Rect, TextFragment};
use crate::traits::{TextLayer, Viewport};
use std::ops::Range;

/// Fallback prefix lengths, in characters, tried in order
const FALLBACK_PREFIXES: [(usize, MatchTier); 2] =
    [(50, MatchTier::Prefix50), (30, MatchTier::Prefix30)];

/// Which search tier produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// The whole snippet was found
    Exact,
    /// Only the first 50 characters were found
    Prefix50,
    /// Only the first 30 characters were found
    Prefix30,
}

/// Fragments covered by a located snippet
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Indices into the page's fragment list, in page order
    pub fragments: Vec<usize>,
    /// First matched fragment; the scroll anchor
    pub anchor: usize,
    /// Matched byte range of the haystack
    pub range: Range<usize>,
    /// Tier that matched
    pub tier: MatchTier,
}

/// Lowercase, collapse whitespace runs to one space, trim
pub fn normalize_snippet(snippet: &str) -> String {
    snippet
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// All non-empty fragments of a page joined into one searchable string
#[derive(Debug, Clone, Default)]
pub struct Haystack {
    text: String,
    /// (fragment index, byte range of its text inside `text`)
    spans: Vec<(usize, Range<usize>)>,
}

impl Haystack {
    /// Build the haystack from fragments in page order
    ///
    /// Each fragment is trimmed and lowercased and followed by one space. The
    /// recorded range excludes that separator.
    pub fn build<H>(fragments: &[TextFragment<H>]) -> Self {
        let mut text = String::new();
        let mut spans = Vec::with_capacity(fragments.len());

        for (index, fragment) in fragments.iter().enumerate() {
            let trimmed = fragment.text.trim();
            if trimmed.is_empty() {
                continue;
            }
            let start = text.len();
            text.push_str(&trimmed.to_lowercase());
            spans.push((index, start..text.len()));
            text.push(' ');
        }

        Self { text, spans }
    }

    /// The concatenated text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Find `needle` (already normalized), falling back to its prefixes
    ///
    /// Returns the byte range to highlight and the tier that matched. The
    /// lowest offset wins when the needle occurs more than once.
    pub fn find(&self, needle: &str) -> Option<(Range<usize>, MatchTier)> {
        if needle.is_empty() {
            return None;
        }

        let (start, tier) = self
            .text
            .find(needle)
            .map(|s| (s, MatchTier::Exact))
            .or_else(|| {
                FALLBACK_PREFIXES.iter().find_map(|&(chars, tier)| {
                    let prefix = char_prefix(needle, chars)?;
                    self.text.find(prefix).map(|s| (s, tier))
                })
            })?;

        let end = (start + needle.len()).min(self.text.len());
        Some((start..end, tier))
    }

    /// Fragment indices whose range touches `range`
    pub fn overlapping(&self, range: &Range<usize>) -> Vec<usize> {
        self.spans
            .iter()
            .filter(|(_, span)| !(span.end < range.start || span.start > range.end))
            .map(|(index, _)| *index)
            .collect()
    }
}

/// The first `chars` characters of `s`, only if `s` is longer than that
fn char_prefix(s: &str, chars: usize) -> Option<&str> {
    s.char_indices().nth(chars).map(|(byte, _)| &s[..byte])
}

/// Locate `snippet` among `fragments` without touching any styles
pub fn locate<H>(fragments: &[TextFragment<H>], snippet: &str) -> Option<MatchResult> {
    let needle = normalize_snippet(snippet);
    let haystack = Haystack::build(fragments);
    let (range, tier) = haystack.find(&needle)?;

    let matched = haystack.overlapping(&range);
    let anchor = *matched.first()?;

    Some(MatchResult {
        fragments: matched,
        anchor,
        range,
        tier,
    })
}

/// Scroll offset that puts the anchor's vertical centre at the viewport's
///
/// Both rectangles are in the same (screen) coordinates. Never negative.
pub fn scroll_target(anchor: Rect, viewport: Rect, scroll_top: f64) -> f64 {
    let target = scroll_top + (anchor.center_y() - viewport.y) - viewport.height / 2.0;
    target.max(0.0)
}

/// Highlights located snippets, keeping exactly one generation alive
///
/// Every call to [`highlight`](Self::highlight) first restores the fragments
/// styled by the previous call, so switching citations quickly never leaves
/// stale highlights behind.
#[derive(Debug, Clone)]
pub struct SnippetLocator<H> {
    style: HighlightStyle,
    active: Vec<H>,
    generation: u64,
}

impl<H: Clone> Default for SnippetLocator<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Clone> SnippetLocator<H> {
    /// Create a locator using the default highlight style
    pub fn new() -> Self {
        Self::with_style(HighlightStyle::default())
    }

    /// Create a locator with a custom highlight style
    pub fn with_style(style: HighlightStyle) -> Self {
        Self {
            style,
            active: Vec::new(),
            generation: 0,
        }
    }

    /// Number of fragments currently highlighted
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Incremented on every clear; identifies the live highlight generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Restore the style of every fragment highlighted by the last match
    pub fn clear<L>(&mut self, layer: &mut L)
    where
        L: TextLayer<Handle = H>,
    {
        for handle in self.active.drain(..) {
            layer.set_highlight(&handle, None);
        }
        self.generation += 1;
    }

    /// Clear the previous generation, then locate and highlight `snippet`
    ///
    /// Returns `None` (with nothing highlighted) when the snippet is empty or
    /// cannot be found on this page.
    pub fn highlight<L>(&mut self, layer: &mut L, snippet: &str) -> Option<MatchResult>
    where
        L: TextLayer<Handle = H>,
    {
        self.clear(layer);

        let fragments = layer.fragments();
        let result = locate(&fragments, snippet)?;

        for &index in &result.fragments {
            if let Some(fragment) = fragments.get(index) {
                layer.set_highlight(&fragment.handle, Some(&self.style));
                self.active.push(fragment.handle.clone());
            }
        }
        Some(result)
    }

    /// Highlight `snippet` and scroll the viewport to centre the anchor
    ///
    /// Returns the match and the scroll offset requested, if any.
    pub fn reveal<L, V>(
        &mut self,
        layer: &mut L,
        viewport: &mut V,
        snippet: &str,
    ) -> Option<(MatchResult, Option<f64>)>
    where
        L: TextLayer<Handle = H>,
        V: Viewport,
    {
        let result = self.highlight(layer, snippet)?;

        let anchor_bounds = layer
            .fragments()
            .get(result.anchor)
            .and_then(|f| layer.bounds(&f.handle));

        let target = anchor_bounds.map(|bounds| {
            let top = scroll_target(bounds, viewport.bounds(), viewport.scroll_top());
            viewport.scroll_to(top);
            top
        });

        Some((result, target))
    }
}
