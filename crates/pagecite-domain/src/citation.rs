//! Citation module - references from answer text to a passage on a page

use std::fmt;

/// A citation attached to an assistant turn
///
/// The `id` matches an inline `[id]` marker in the answer text. Two citations
/// are the same citation when they agree on `(id, document, page)`; the snippet
/// does not take part in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// Marker number used in the answer text
    pub id: u32,

    /// Document identifier (file name on the server)
    pub document: String,

    /// 1-based page number
    pub page: u32,

    /// Exact passage the citation refers to
    pub snippet: String,
}

impl Citation {
    /// Create a new citation
    pub fn new(
        id: u32,
        document: impl Into<String>,
        page: u32,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            id,
            document: document.into(),
            page,
            snippet: snippet.into(),
        }
    }

    /// Whether `other` is the same citation for deduplication purposes
    pub fn same_source(&self, other: &Citation) -> bool {
        self.id == other.id && self.page == other.page && self.document == other.document
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} p.{}", self.id, self.document, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_source_ignores_snippet() {
        let a = Citation::new(1, "lease.pdf", 3, "first extraction");
        let b = Citation::new(1, "lease.pdf", 3, "re-extracted text");
        assert!(a.same_source(&b));
    }

    #[test]
    fn test_same_source_distinguishes_page() {
        let a = Citation::new(1, "lease.pdf", 3, "x");
        let b = Citation::new(1, "lease.pdf", 4, "x");
        assert!(!a.same_source(&b));
    }

    #[test]
    fn test_display() {
        let c = Citation::new(2, "AI.pdf", 7, "snippet");
        assert_eq!(c.to_string(), "[2] AI.pdf p.7");
    }
}
