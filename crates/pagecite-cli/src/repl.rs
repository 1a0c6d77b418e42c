//! Interactive REPL (Read-Eval-Print Loop) mode.
//!
//! Anything that is not a command is sent as a question.

use crate::commands::{self, PageDisplay};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::layer::LayerStore;
use crate::output::Formatter;
use pagecite_session::{ChatSession, HighlightDriver};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Run the interactive REPL.
pub async fn run_repl(mut session: ChatSession, config: &Config, formatter: &Formatter) -> Result<()> {
    println!(
        "{}",
        formatter.info(&format!(
            "pagecite REPL on {} - ask a question, 'help' for commands, 'exit' to quit",
            session.client().base_url()
        ))
    );
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(config.settings.history_size)?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)?;

    let history_path = get_history_path(config)?;
    let _ = editor.load_history(&history_path);

    let store = config
        .get_active_profile()
        .ok()
        .and_then(|p| p.text_layer_dir.clone())
        .map(LayerStore::new);
    let mut display = PageDisplay::new(
        store,
        HighlightDriver::with_timing(config.settings.highlight_timing()),
    );

    loop {
        match editor.readline("pagecite> ") {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        print_help(formatter);
                    }
                    Ok(cmd) => {
                        if let Err(e) = execute_repl_command(cmd, &mut session, &mut display, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// REPL command type.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Exit,
    Help,
    Ask(String),
    Sources,
    Open(u32),
    Page(PageMove),
    Zoom(ZoomMove),
    Upload(PathBuf),
    Reset,
    History,
    Health,
}

#[derive(Debug, PartialEq)]
enum PageMove {
    Next,
    Prev,
    To(u32),
}

#[derive(Debug, PartialEq)]
enum ZoomMove {
    In,
    Out,
}

/// Parse a REPL command line.
fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = parts.split_first() else {
        return Err(CliError::InvalidInput("Empty command".to_string()));
    };

    let command = match (verb, args) {
        ("exit" | "quit" | "q", []) => ReplCommand::Exit,
        ("help" | "?", []) => ReplCommand::Help,
        ("sources", []) => ReplCommand::Sources,
        ("history", []) => ReplCommand::History,
        ("reset", []) => ReplCommand::Reset,
        ("health", []) => ReplCommand::Health,
        ("open", []) => {
            return Err(CliError::InvalidInput("Usage: open <citation number>".to_string()));
        }
        ("open", [n]) if n.parse::<u32>().is_ok() => ReplCommand::Open(parse_number(n)?),
        ("page", ["next" | "n"]) => ReplCommand::Page(PageMove::Next),
        ("page", ["prev" | "previous" | "p"]) => ReplCommand::Page(PageMove::Prev),
        ("page", [n]) if n.parse::<u32>().is_ok() => ReplCommand::Page(PageMove::To(parse_number(n)?)),
        ("page", _) => {
            return Err(CliError::InvalidInput("Usage: page next|prev|<n>".to_string()));
        }
        ("zoom", ["in" | "+"]) => ReplCommand::Zoom(ZoomMove::In),
        ("zoom", ["out" | "-"]) => ReplCommand::Zoom(ZoomMove::Out),
        ("zoom", _) => {
            return Err(CliError::InvalidInput("Usage: zoom in|out".to_string()));
        }
        ("upload", []) => {
            return Err(CliError::InvalidInput("Usage: upload <file.pdf>".to_string()));
        }
        ("upload", rest) => ReplCommand::Upload(PathBuf::from(rest.join(" "))),
        ("ask", []) => {
            return Err(CliError::InvalidInput("Usage: ask <question>".to_string()));
        }
        ("ask", rest) => ReplCommand::Ask(rest.join(" ")),
        _ => ReplCommand::Ask(line.to_string()),
    };

    Ok(command)
}

fn parse_number(s: &str) -> Result<u32> {
    s.parse()
        .map_err(|_| CliError::InvalidInput(format!("Not a number: {}", s)))
}

/// Execute a REPL command.
async fn execute_repl_command(
    cmd: ReplCommand,
    session: &mut ChatSession,
    display: &mut PageDisplay,
    formatter: &Formatter,
) -> Result<()> {
    match cmd {
        ReplCommand::Ask(query) => {
            commands::stream_answer(&query, session, formatter).await?;
            let cited = session
                .conversation()
                .transcript()
                .last_assistant()
                .map(|turn| turn.citations().len())
                .unwrap_or(0);
            if cited > 0 {
                println!(
                    "{}",
                    formatter.info(&format!(
                        "{} source(s): 'sources' to list, 'open <n>' to view",
                        cited
                    ))
                );
            }
        }
        ReplCommand::Sources => match session.conversation().transcript().last_assistant() {
            Some(turn) => println!("{}", formatter.sources(turn.citations())?),
            None => println!("{}", formatter.info("No answer yet")),
        },
        ReplCommand::Open(id) => {
            commands::open_citation(id, session, display, formatter).await?;
        }
        ReplCommand::Page(movement) => {
            if session.viewer().selection().is_none() {
                return Err(CliError::InvalidInput("No document open. Use 'open <n>' first.".to_string()));
            }
            let viewer = session.viewer_mut();
            let moved = match movement {
                PageMove::Next => viewer.next_page(),
                PageMove::Prev => viewer.prev_page(),
                PageMove::To(page) => viewer.go_to(page),
            };
            if !moved {
                println!("{}", formatter.warning("Page unchanged"));
                return Ok(());
            }
            commands::show_page(session, display, formatter).await?;
        }
        ReplCommand::Zoom(direction) => {
            let viewer = session.viewer_mut();
            let changed = match direction {
                ZoomMove::In => viewer.zoom_in(),
                ZoomMove::Out => viewer.zoom_out(),
            };
            let zoom = session.viewer().zoom();
            if !changed {
                println!("{}", formatter.warning(&format!("Zoom already at {}%", zoom)));
                return Ok(());
            }
            println!("{}", formatter.info(&format!("Zoom {}%", zoom)));
            if session.viewer().selection().is_some() {
                commands::show_page(session, display, formatter).await?;
            }
        }
        ReplCommand::Upload(file) => {
            commands::execute_upload(crate::cli::UploadArgs { file }, session, formatter).await?;
        }
        ReplCommand::Reset => {
            session.reset().await?;
            println!("{}", formatter.success("Session reset"));
        }
        ReplCommand::History => {
            println!("{}", formatter.transcript(session.conversation().transcript()));
        }
        ReplCommand::Health => {
            commands::execute_health(session.client(), formatter).await?;
        }
        ReplCommand::Exit | ReplCommand::Help => {}
    }

    Ok(())
}

fn get_history_path(config: &Config) -> Result<PathBuf> {
    let dir = config.dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  <question>                 - Ask a question (same as 'ask')");
    println!("  ask <question>             - Ask a question");
    println!("  sources                    - List sources of the latest answer");
    println!("  open <n>                   - Show the passage cited as [n]");
    println!("  page next|prev|<n>         - Move through the open document");
    println!("  zoom in|out                - Change zoom (50% to 200%)");
    println!("  upload <file.pdf>          - Upload a PDF");
    println!("  reset                      - Remove documents and clear the chat");
    println!("  history                    - Show the conversation");
    println!("  health                     - Check the backend");
    println!("  help, ?                    - Show this help");
    println!("  exit, quit, q              - Exit REPL");
    println!();
}
