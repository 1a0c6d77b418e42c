//! Transcript module - the ordered list of chat turns

use crate::turn::{ChatTurn, Role};

/// Conversation transcript, oldest turn first
///
/// Earlier turns are never rewritten; only the last turn is mutated, and only
/// by the [`Conversation`](crate::Conversation) while its stream is open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the transcript has no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent assistant turn, if any
    pub fn last_assistant(&self) -> Option<&ChatTurn> {
        self.turns.iter().rev().find(|t| t.role() == Role::Assistant)
    }

    pub(crate) fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut ChatTurn> {
        self.turns.last_mut()
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }
}
