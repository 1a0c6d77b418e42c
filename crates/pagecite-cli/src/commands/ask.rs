//! Ask command implementation.

use crate::cli::AskArgs;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::Formatter;
use pagecite_domain::Applied;
use pagecite_session::ChatSession;
use std::io::{self, Write};

/// Execute the ask command.
pub async fn execute_ask(
    args: AskArgs,
    session: &mut ChatSession,
    formatter: &Formatter,
) -> Result<()> {
    let query = args.query();
    stream_answer(&query, session, formatter).await?;

    if let Some(turn) = session.conversation().transcript().last_assistant() {
        match formatter.format() {
            OutputFormat::Json => println!("{}", formatter.answer_json(&query, turn)?),
            OutputFormat::Quiet => println!("{}", turn.text()),
            OutputFormat::Table => {
                if !turn.citations().is_empty() {
                    println!("{}", formatter.sources(turn.citations())?);
                }
            }
        }
    }

    Ok(())
}

/// Submit `query` and pump its answer stream until it finishes.
///
/// In table format the answer is echoed as it arrives. Ctrl+C abandons the
/// stream and keeps the partial answer.
pub async fn stream_answer(
    query: &str,
    session: &mut ChatSession,
    formatter: &Formatter,
) -> Result<()> {
    if !session.submit(query).await? {
        println!("{}", formatter.warning("Nothing to ask"));
        return Ok(());
    }

    let live = formatter.format() == OutputFormat::Table;
    let mut wrote_text = false;

    let interrupted = tokio::select! {
        _ = session.run_to_completion(|applied| {
            if live {
                echo(applied, formatter, &mut wrote_text);
            }
        }) => false,
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        session.cancel();
        if wrote_text {
            println!();
        }
        eprintln!("{}", formatter.warning("Answer interrupted"));
    }

    Ok(())
}

fn echo(applied: &Applied, formatter: &Formatter, wrote_text: &mut bool) {
    match applied {
        Applied::ToolAdded(tool) => {
            if *wrote_text {
                println!();
                *wrote_text = false;
            }
            println!("{}", formatter.tool(tool));
        }
        Applied::TextAppended(delta) => {
            print!("{}", delta);
            io::stdout().flush().ok();
            *wrote_text = true;
        }
        Applied::Finished => {
            if *wrote_text {
                println!();
            }
        }
        Applied::CitationAdded(_) | Applied::Duplicate | Applied::Ignored => {}
    }
}
