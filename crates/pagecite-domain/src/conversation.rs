//! Stream reconciliation
//!
//! The answer stream may carry either the whole answer so far in every `text`
//! event or only the newest increment, depending on the server deployment. The
//! [`Conversation`] accepts both: each snapshot is diffed against the previous
//! one and only the delta is appended, so the transcript is strictly
//! append-only and marker parsing never has to revisit rendered text.

use crate::citation::Citation;
use crate::transcript::Transcript;
use crate::turn::{ChatTurn, ToolEvent};

/// One decoded event of the answer stream, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Tool-use notice
    Tool(ToolEvent),

    /// Answer text, cumulative or incremental
    Text(String),

    /// Citation record
    Citation(Citation),

    /// End of stream
    Done,
}

/// What applying an event changed
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// This text was appended to the assistant turn (never empty)
    TextAppended(String),

    /// A new tool event was recorded
    ToolAdded(ToolEvent),

    /// A new citation was recorded
    CitationAdded(Citation),

    /// The event repeated one already recorded, or carried no new text
    Duplicate,

    /// The stream closed; the turn is now immutable
    Finished,

    /// No stream is open, so the event was dropped
    Ignored,
}

/// Compute the text to append for `snapshot` given the previous snapshot
///
/// If `snapshot` extends `previous`, the delta is the new suffix. Otherwise the
/// whole snapshot is new text; this branch is what keeps incremental servers
/// working, at the cost of repeating text when a cumulative server restarts.
///
/// # Examples
///
/// ```
/// use pagecite_domain::snapshot_delta;
///
/// assert_eq!(snapshot_delta("The", "The contract"), " contract");
/// assert_eq!(snapshot_delta("The contract", " terminates"), " terminates");
/// ```
pub fn snapshot_delta<'a>(previous: &str, snapshot: &'a str) -> &'a str {
    snapshot.strip_prefix(previous).unwrap_or(snapshot)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Streaming,
}

/// Transcript plus the reconciliation state of the live answer stream
#[derive(Debug, Clone)]
pub struct Conversation {
    transcript: Transcript,
    last_snapshot: String,
    phase: Phase,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Create an empty conversation with no open stream
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            last_snapshot: String::new(),
            phase: Phase::Idle,
        }
    }

    /// The transcript so far
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether an answer is still streaming
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Streaming
    }

    /// Start a new turn for `query`
    ///
    /// Returns `false` and changes nothing when the query is blank. Otherwise
    /// the previous turn is closed (whatever it holds is kept), a user turn and
    /// an empty assistant turn are appended, and the snapshot baseline resets.
    /// Closing the network stream itself is the caller's job.
    pub fn submit(&mut self, query: &str) -> bool {
        if query.trim().is_empty() {
            return false;
        }

        self.transcript.push(ChatTurn::user(query));
        self.transcript.push(ChatTurn::assistant());
        self.last_snapshot.clear();
        self.phase = Phase::Streaming;
        true
    }

    /// Dispatch a stream event to its handler
    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        match event {
            StreamEvent::Tool(tool) => self.on_tool(tool),
            StreamEvent::Text(snapshot) => self.on_text(snapshot),
            StreamEvent::Citation(citation) => self.on_citation(citation),
            StreamEvent::Done => self.on_done(),
        }
    }

    /// Record a tool event unless the same (name, message) was already seen
    pub fn on_tool(&mut self, tool: ToolEvent) -> Applied {
        let Some(turn) = self.open_turn() else {
            return Applied::Ignored;
        };
        if turn.push_tool(tool.clone()) {
            Applied::ToolAdded(tool)
        } else {
            Applied::Duplicate
        }
    }

    /// Append the part of `snapshot` not seen before
    pub fn on_text(&mut self, snapshot: String) -> Applied {
        if self.phase != Phase::Streaming {
            return Applied::Ignored;
        }

        let delta = snapshot_delta(&self.last_snapshot, &snapshot).to_string();
        if let Some(turn) = self.transcript.last_mut() {
            turn.append_text(&delta);
        }
        self.last_snapshot = snapshot;

        if delta.is_empty() {
            Applied::Duplicate
        } else {
            Applied::TextAppended(delta)
        }
    }

    /// Record a citation unless the same (id, document, page) was already seen
    pub fn on_citation(&mut self, citation: Citation) -> Applied {
        let Some(turn) = self.open_turn() else {
            return Applied::Ignored;
        };
        if turn.push_citation(citation.clone()) {
            Applied::CitationAdded(citation)
        } else {
            Applied::Duplicate
        }
    }

    /// Close the stream; later events for this turn are ignored
    pub fn on_done(&mut self) -> Applied {
        if self.phase != Phase::Streaming {
            return Applied::Ignored;
        }
        self.phase = Phase::Idle;
        Applied::Finished
    }

    /// A dropped or failed stream ends the turn exactly like `done`
    pub fn on_transport_error(&mut self) -> Applied {
        self.on_done()
    }

    /// Forget every turn and close any open stream
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.last_snapshot.clear();
        self.phase = Phase::Idle;
    }

    fn open_turn(&mut self) -> Option<&mut ChatTurn> {
        if self.phase != Phase::Streaming {
            return None;
        }
        self.transcript.last_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::Role;

    fn answer(conv: &Conversation) -> &str {
        conv.transcript().last_assistant().map(|t| t.text()).unwrap_or("")
    }

    #[test]
    fn test_blank_query_is_rejected() {
        let mut conv = Conversation::new();
        assert!(!conv.submit("   \n\t"));
        assert!(conv.transcript().is_empty());
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_submit_appends_user_and_assistant() {
        let mut conv = Conversation::new();
        assert!(conv.submit("What is the termination clause?"));

        let turns = conv.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role(), Role::User);
        assert_eq!(turns[0].text(), "What is the termination clause?");
        assert_eq!(turns[1].role(), Role::Assistant);
        assert_eq!(turns[1].text(), "");
        assert!(conv.is_loading());
    }

    #[test]
    fn test_cumulative_snapshots_do_not_repeat() {
        let mut conv = Conversation::new();
        conv.submit("What is the termination clause?");

        for snapshot in ["The", "The contract", "The contract terminates"] {
            conv.apply(StreamEvent::Text(snapshot.to_string()));
        }

        assert_eq!(answer(&conv), "The contract terminates");
    }

    #[test]
    fn test_incremental_tokens_are_appended() {
        let mut conv = Conversation::new();
        conv.submit("q");

        let deltas: Vec<Applied> = ["The", " contract", " terminates"]
            .into_iter()
            .map(|t| conv.on_text(t.to_string()))
            .collect();

        assert_eq!(answer(&conv), "The contract terminates");
        assert_eq!(deltas[1], Applied::TextAppended(" contract".to_string()));
    }

    #[test]
    fn test_repeated_snapshot_is_duplicate() {
        let mut conv = Conversation::new();
        conv.submit("q");
        conv.on_text("Hello".to_string());
        assert_eq!(conv.on_text("Hello".to_string()), Applied::Duplicate);
        assert_eq!(answer(&conv), "Hello");
    }

    #[test]
    fn test_divergent_snapshot_appends_whole_payload() {
        let mut conv = Conversation::new();
        conv.submit("q");
        conv.on_text("The contract".to_string());
        let applied = conv.on_text("A lease".to_string());

        assert_eq!(applied, Applied::TextAppended("A lease".to_string()));
        assert_eq!(answer(&conv), "The contractA lease");
    }

    #[test]
    fn test_baseline_resets_between_turns() {
        let mut conv = Conversation::new();
        conv.submit("first");
        conv.on_text("Yes".to_string());
        conv.on_done();

        conv.submit("second");
        conv.on_text("Yes, and more".to_string());
        assert_eq!(answer(&conv), "Yes, and more");
        assert_eq!(conv.transcript().turns()[1].text(), "Yes");
    }

    #[test]
    fn test_tool_and_citation_dedup_keep_first_seen_order() {
        let mut conv = Conversation::new();
        conv.submit("q");

        conv.on_tool(ToolEvent::new("semantic_search", "Searching documents..."));
        assert_eq!(
            conv.on_tool(ToolEvent::new("semantic_search", "Searching documents...")),
            Applied::Duplicate
        );

        conv.on_citation(Citation::new(3, "a.pdf", 4, "x"));
        conv.on_citation(Citation::new(1, "a.pdf", 2, "y"));
        assert_eq!(
            conv.on_citation(Citation::new(3, "a.pdf", 4, "different snippet")),
            Applied::Duplicate
        );

        let turn = conv.transcript().last_assistant().unwrap();
        assert_eq!(turn.tools().len(), 1);
        let ids: Vec<u32> = turn.citations().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_events_after_done_are_ignored() {
        let mut conv = Conversation::new();
        conv.submit("q");
        conv.on_text("partial".to_string());
        assert_eq!(conv.apply(StreamEvent::Done), Applied::Finished);
        assert!(!conv.is_loading());

        assert_eq!(conv.on_text("partial and late".to_string()), Applied::Ignored);
        assert_eq!(
            conv.on_citation(Citation::new(1, "a.pdf", 1, "s")),
            Applied::Ignored
        );
        assert_eq!(conv.on_done(), Applied::Ignored);
        assert_eq!(answer(&conv), "partial");
    }

    #[test]
    fn test_transport_error_keeps_partial_answer() {
        let mut conv = Conversation::new();
        conv.submit("q");
        conv.on_text("The contract".to_string());
        assert_eq!(conv.on_transport_error(), Applied::Finished);
        assert_eq!(answer(&conv), "The contract");
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_resubmit_closes_previous_turn() {
        let mut conv = Conversation::new();
        conv.submit("first");
        conv.on_text("half an ans".to_string());
        conv.submit("second");

        let turns = conv.transcript().turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[1].text(), "half an ans");
        assert!(conv.is_loading());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut conv = Conversation::new();
        conv.submit("q");
        conv.on_text("a".to_string());
        conv.reset();
        assert!(conv.transcript().is_empty());
        assert!(!conv.is_loading());
        assert_eq!(conv.on_text("b".to_string()), Applied::Ignored);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: cumulative snapshots rebuild the final payload, and the
        /// transcript equals the concatenation of all deltas
        #[test]
        fn test_extending_snapshots_rebuild_final(pieces in prop::collection::vec(".{0,12}", 1..12)) {
            let mut conv = Conversation::new();
            conv.submit("q");

            let mut snapshot = String::new();
            let mut deltas = String::new();
            for piece in &pieces {
                snapshot.push_str(piece);
                if let Applied::TextAppended(d) = conv.on_text(snapshot.clone()) {
                    deltas.push_str(&d);
                }
            }

            let text = conv.transcript().last_assistant().unwrap().text().to_string();
            prop_assert_eq!(&text, &snapshot);
            prop_assert_eq!(&text, &deltas);
        }

        /// Property: a snapshot that does not extend the previous one is
        /// appended in full
        #[test]
        fn test_non_extending_snapshot_is_kept_whole(first in "[a-m]{1,20}", second in "[n-z]{1,20}") {
            let mut conv = Conversation::new();
            conv.submit("q");
            conv.on_text(first.clone());
            let applied = conv.on_text(second.clone());

            prop_assert_eq!(applied, Applied::TextAppended(second.clone()));
            let text = conv.transcript().last_assistant().unwrap().text().to_string();
            prop_assert_eq!(text, format!("{first}{second}"));
        }

        /// Property: redelivering a tool event or citation grows the list by one
        #[test]
        fn test_redelivery_is_idempotent(id in 0u32..50, page in 1u32..500, name in "[a-z_]{1,12}") {
            let mut conv = Conversation::new();
            conv.submit("q");

            let tool = ToolEvent::new(name, "working");
            conv.on_tool(tool.clone());
            conv.on_tool(tool);

            let citation = Citation::new(id, "doc.pdf", page, "s");
            conv.on_citation(citation.clone());
            conv.on_citation(citation);

            let turn = conv.transcript().last_assistant().unwrap();
            prop_assert_eq!(turn.tools().len(), 1);
            prop_assert_eq!(turn.citations().len(), 1);
        }

        /// Property: citations keep arrival order regardless of numeric id
        #[test]
        fn test_citation_order_is_arrival_order(ids in prop::collection::hash_set(0u32..1000, 1..20)) {
            let ids: Vec<u32> = ids.into_iter().collect();
            let mut conv = Conversation::new();
            conv.submit("q");
            for id in &ids {
                conv.on_citation(Citation::new(*id, "doc.pdf", 1, "s"));
            }

            let seen: Vec<u32> = conv
                .transcript()
                .last_assistant()
                .unwrap()
                .citations()
                .iter()
                .map(|c| c.id)
                .collect();
            prop_assert_eq!(seen, ids);
        }
    }
}
