//! Citation marker parsing
//!
//! Answer text carries inline markers such as `[3]`. A marker is clickable only
//! when the same turn holds a citation with that id; otherwise it is rendered
//! as the literal text it came from.

use crate::citation::Citation;
use regex::Regex;
use std::sync::OnceLock;

static MARKER_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn marker_regex() -> Option<&'static Regex> {
    MARKER_REGEX
        .get_or_init(|| Regex::new(r"\[(\d+)\]").ok())
        .as_ref()
}

/// A piece of answer text
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    /// Plain text, including unresolved markers
    Text(&'a str),

    /// A `[n]` marker that resolves to a citation of the same turn
    Marker {
        /// The number between the brackets
        number: u32,
        /// The citation it points at
        citation: &'a Citation,
    },
}

/// Split `text` into plain runs and resolved citation markers
///
/// Adjacent plain runs are merged, so an unresolved marker simply becomes part
/// of the surrounding text.
pub fn segments<'a>(text: &'a str, citations: &'a [Citation]) -> Vec<Segment<'a>> {
    let Some(marker) = marker_regex() else {
        return vec![Segment::Text(text)];
    };
    let mut out = Vec::new();
    let mut plain_start = 0;

    for caps in marker.captures_iter(text) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let resolved = caps[1]
            .parse::<u32>()
            .ok()
            .and_then(|n| citations.iter().find(|c| c.id == n).map(|c| (n, c)));

        if let Some((number, citation)) = resolved {
            if whole.start() > plain_start {
                out.push(Segment::Text(&text[plain_start..whole.start()]));
            }
            out.push(Segment::Marker { number, citation });
            plain_start = whole.end();
        }
    }

    if plain_start < text.len() {
        out.push(Segment::Text(&text[plain_start..]));
    }
    out
}

/// Marker numbers referenced in `text`, in order of appearance, without repeats
pub fn referenced_ids(text: &str) -> Vec<u32> {
    let mut ids = Vec::new();
    let Some(marker) = marker_regex() else {
        return ids;
    };
    for caps in marker.captures_iter(text) {
        if let Ok(n) = caps[1].parse::<u32>() {
            if !ids.contains(&n) {
                ids.push(n);
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cites() -> Vec<Citation> {
        vec![
            Citation::new(1, "lease.pdf", 2, "a"),
            Citation::new(3, "lease.pdf", 9, "b"),
        ]
    }

    #[test]
    fn test_resolved_markers_split_text() {
        let citations = cites();
        let segs = segments("Rent is due monthly [1] and late fees apply [3].", &citations);

        assert_eq!(segs.len(), 5);
        assert_eq!(segs[0], Segment::Text("Rent is due monthly "));
        assert!(matches!(segs[1], Segment::Marker { number: 1, .. }));
        assert_eq!(segs[2], Segment::Text(" and late fees apply "));
        assert!(matches!(segs[3], Segment::Marker { number: 3, citation } if citation.page == 9));
        assert_eq!(segs[4], Segment::Text("."));
    }

    #[test]
    fn test_unresolved_marker_stays_plain() {
        let citations = cites();
        let segs = segments("See [2] for details", &citations);
        assert_eq!(segs, vec![Segment::Text("See [2] for details")]);
    }

    #[test]
    fn test_overflowing_marker_stays_plain() {
        let citations = cites();
        let segs = segments("x [99999999999999] y", &citations);
        assert_eq!(segs, vec![Segment::Text("x [99999999999999] y")]);
    }

    #[test]
    fn test_empty_text() {
        assert!(segments("", &cites()).is_empty());
    }

    #[test]
    fn test_referenced_ids() {
        assert_eq!(referenced_ids("[2] then [1] and [2] again, not [x]"), vec![2, 1]);
    }
}
