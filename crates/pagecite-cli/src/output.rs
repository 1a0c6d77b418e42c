//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use pagecite_domain::{ChatTurn, Citation, MatchResult, MatchTier, PageView, Role, Segment, ToolEvent, Transcript};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest snippet shown in the sources table.
const SNIPPET_WIDTH: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Answer text with resolved citation markers highlighted.
    pub fn answer(&self, turn: &ChatTurn) -> String {
        turn.segments()
            .into_iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.to_string(),
                Segment::Marker { number, .. } => self.colorize(&format!("[{}]", number), "cyan"),
            })
            .collect()
    }

    /// A finished turn as JSON.
    pub fn answer_json(&self, query: &str, turn: &ChatTurn) -> Result<String> {
        let value = serde_json::json!({
            "query": query,
            "answer": turn.text(),
            "tools": turn.tools().iter().map(|t| serde_json::json!({
                "name": t.name,
                "message": t.message,
            })).collect::<Vec<_>>(),
            "citations": citations_json(turn.citations()),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Format the sources of a turn.
    pub fn sources(&self, citations: &[Citation]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&citations_json(citations))?),
            OutputFormat::Table => Ok(self.sources_table(citations)),
            OutputFormat::Quiet => Ok(citations
                .iter()
                .map(|c| format!("{}\t{}\t{}", c.id, c.document, c.page))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn sources_table(&self, citations: &[Citation]) -> String {
        if citations.is_empty() {
            return self.colorize("No sources cited.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Document", "Page", "Snippet"]);

        for citation in citations {
            builder.push_record([
                citation.id.to_string(),
                citation.document.clone(),
                citation.page.to_string(),
                truncate(&citation.snippet, SNIPPET_WIDTH),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Tool progress line.
    pub fn tool(&self, tool: &ToolEvent) -> String {
        let line = if tool.message.is_empty() {
            format!("⚙ {}", tool.name)
        } else {
            format!("⚙ {}: {}", tool.name, tool.message)
        };
        self.colorize(&line, "magenta")
    }

    /// Full transcript, one block per turn.
    pub fn transcript(&self, transcript: &Transcript) -> String {
        if transcript.is_empty() {
            return self.info("No messages yet.");
        }

        transcript
            .turns()
            .iter()
            .map(|turn| match turn.role() {
                Role::User => format!("{} {}", self.colorize("you>", "blue"), turn.text()),
                Role::Assistant => format!("{} {}", self.colorize("ai>", "green"), self.answer(turn)),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Header line for a displayed page.
    pub fn page_header(&self, view: &PageView, total_pages: Option<u32>) -> String {
        let total = total_pages
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        self.colorize(
            &format!(
                "── {} · page {}/{} · {}% ──",
                view.document, view.page, total, view.zoom
            ),
            "cyan",
        )
    }

    /// Visible page lines with highlighted fragments marked.
    pub fn page_lines(&self, lines: &[Vec<(&str, bool)>]) -> String {
        if lines.is_empty() {
            return self.colorize("(no text on this part of the page)", "yellow");
        }

        lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|(text, highlighted)| self.mark(text.trim(), *highlighted))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Summary of a locate match.
    pub fn match_summary(&self, result: &MatchResult, scroll_top: Option<f64>) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "found": true,
                    "tier": tier_label(result.tier),
                    "fragments": result.fragments,
                    "anchor": result.anchor,
                    "scroll_top": scroll_top,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(result
                .fragments
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(" ")),
            OutputFormat::Table => {
                let scroll = scroll_top
                    .map(|t| format!("{:.0}", t))
                    .unwrap_or_else(|| "-".to_string());
                Ok(self.success(&format!(
                    "Matched {} fragment(s) ({}), scroll to {}",
                    result.fragments.len(),
                    tier_label(result.tier),
                    scroll
                )))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn mark(&self, text: &str, highlighted: bool) -> String {
        match (highlighted, self.color_enabled) {
            (false, _) => text.to_string(),
            (true, true) => text.black().on_yellow().to_string(),
            (true, false) => format!(">>{}<<", text),
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Short name of a match tier.
pub fn tier_label(tier: MatchTier) -> &'static str {
    match tier {
        MatchTier::Exact => "exact",
        MatchTier::Prefix50 => "prefix-50",
        MatchTier::Prefix30 => "prefix-30",
    }
}

fn citations_json(citations: &[Citation]) -> Vec<serde_json::Value> {
    citations
        .iter()
        .map(|c| {
            serde_json::json!({
                "id": c.id,
                "document": c.document,
                "page": c.page,
                "snippet": c.snippet,
            })
        })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecite_domain::{Conversation, StreamEvent};

    fn answered() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.submit("When is rent due?");
        conversation.apply(StreamEvent::Tool(ToolEvent::new("semantic_search", "Searching")));
        conversation.apply(StreamEvent::Text("Rent is due monthly [1], see [4].".to_string()));
        conversation.apply(StreamEvent::Citation(Citation::new(
            1,
            "lease.pdf",
            7,
            "Rent is due on the first day of each month",
        )));
        conversation.apply(StreamEvent::Done);
        conversation
    }

    #[test]
    fn test_answer_plain() {
        let conversation = answered();
        let turn = conversation.transcript().last_assistant().unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.answer(turn), "Rent is due monthly [1], see [4].");
    }

    #[test]
    fn test_answer_json() {
        let conversation = answered();
        let turn = conversation.transcript().last_assistant().unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);

        let output = formatter.answer_json("When is rent due?", turn).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["answer"], "Rent is due monthly [1], see [4].");
        assert_eq!(value["citations"][0]["page"], 7);
        assert_eq!(value["tools"][0]["name"], "semantic_search");
    }

    #[test]
    fn test_sources_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .sources(&[Citation::new(1, "lease.pdf", 7, "Rent is due")])
            .unwrap();
        assert!(output.contains("Document"));
        assert!(output.contains("lease.pdf"));
    }

    #[test]
    fn test_sources_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter
            .sources(&[
                Citation::new(1, "lease.pdf", 7, "a"),
                Citation::new(2, "lease.pdf", 9, "b"),
            ])
            .unwrap();
        assert_eq!(output, "1\tlease.pdf\t7\n2\tlease.pdf\t9");
    }

    #[test]
    fn test_empty_sources() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.sources(&[]).unwrap().contains("No sources"));
    }

    #[test]
    fn test_page_lines_mark_highlights() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let lines = vec![
            vec![("The tenant ", false), ("shall pay", true)],
            vec![("rent monthly.", true)],
        ];
        assert_eq!(
            formatter.page_lines(&lines),
            "The tenant >>shall pay<<\n>>rent monthly.<<"
        );
    }

    #[test]
    fn test_transcript() {
        let conversation = answered();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.transcript(conversation.transcript());
        assert!(output.starts_with("you> When is rent due?"));
        assert!(output.contains("ai> Rent is due monthly"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
