//! Chat turn module - one message in the transcript

use crate::citation::Citation;
use crate::markers::{self, Segment};

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person asking questions
    User,

    /// The streaming answerer
    Assistant,
}

impl Role {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A tool-use notice emitted by the server while it works on an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEvent {
    /// Tool name (e.g. `semantic_search`)
    pub name: String,

    /// Human-readable progress message
    pub message: String,
}

impl ToolEvent {
    /// Create a new tool event
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// One turn of the conversation
///
/// Text only ever grows by appending. Citations and tool events keep the order
/// in which they were first seen and never contain duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    role: Role,
    text: String,
    citations: Vec<Citation>,
    tools: Vec<ToolEvent>,
}

impl ChatTurn {
    /// Create a user turn holding the query verbatim
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            citations: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Create an empty assistant turn
    pub fn assistant() -> Self {
        Self {
            role: Role::Assistant,
            text: String::new(),
            citations: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Author of this turn
    pub fn role(&self) -> Role {
        self.role
    }

    /// Accumulated text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Citations in first-seen order
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Tool events in first-seen order
    pub fn tools(&self) -> &[ToolEvent] {
        &self.tools
    }

    /// Look up the citation a `[id]` marker refers to
    ///
    /// When the server reused an id for several pages, the first one seen wins.
    pub fn citation(&self, id: u32) -> Option<&Citation> {
        self.citations.iter().find(|c| c.id == id)
    }

    /// Split the text into plain runs and citation markers
    pub fn segments(&self) -> Vec<Segment<'_>> {
        markers::segments(&self.text, &self.citations)
    }

    pub(crate) fn append_text(&mut self, delta: &str) {
        self.text.push_str(delta);
    }

    /// Returns `false` when an equal (name, message) pair is already present.
    pub(crate) fn push_tool(&mut self, tool: ToolEvent) -> bool {
        if self.tools.contains(&tool) {
            return false;
        }
        self.tools.push(tool);
        true
    }

    /// Returns `false` when a citation with the same (id, document, page) exists.
    pub(crate) fn push_citation(&mut self, citation: Citation) -> bool {
        if self.citations.iter().any(|c| c.same_source(&citation)) {
            return false;
        }
        self.citations.push(citation);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_turn_keeps_query_verbatim() {
        let turn = ChatTurn::user("  What is the term?  ");
        assert_eq!(turn.role(), Role::User);
        assert_eq!(turn.text(), "  What is the term?  ");
    }

    #[test]
    fn test_push_tool_dedup() {
        let mut turn = ChatTurn::assistant();
        assert!(turn.push_tool(ToolEvent::new("semantic_search", "Searching documents...")));
        assert!(!turn.push_tool(ToolEvent::new("semantic_search", "Searching documents...")));
        assert!(turn.push_tool(ToolEvent::new("semantic_search", "Reranking...")));
        assert_eq!(turn.tools().len(), 2);
    }

    #[test]
    fn test_citation_lookup_prefers_first_seen() {
        let mut turn = ChatTurn::assistant();
        turn.push_citation(Citation::new(1, "a.pdf", 2, "first"));
        turn.push_citation(Citation::new(1, "a.pdf", 5, "second"));

        assert_eq!(turn.citations().len(), 2);
        assert_eq!(turn.citation(1).map(|c| c.page), Some(2));
        assert!(turn.citation(9).is_none());
    }
}
