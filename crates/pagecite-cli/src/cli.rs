//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pagecite - Chat with your PDFs and jump to the cited passage.
#[derive(Debug, Parser)]
#[command(name = "pagecite")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PAGECITE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Backend URL, overriding the profile
    #[arg(short, long, global = true, env = "PAGECITE_SERVER")]
    pub server: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (answer text only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask a question and stream the answer
    Ask(AskArgs),

    /// Upload a PDF to the backend
    Upload(UploadArgs),

    /// Clear all documents held by the backend
    Reset(ResetArgs),

    /// Find a snippet in a text-layer dump and show the highlight
    Locate(LocateArgs),

    /// Check that the backend is reachable
    Health,

    /// Manage configuration profiles
    Profile(ProfileArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Question text
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

impl AskArgs {
    /// The question as a single string
    pub fn query(&self) -> String {
        self.query.join(" ")
    }
}

/// Arguments for the upload command.
#[derive(Debug, Parser)]
pub struct UploadArgs {
    /// PDF file to upload
    pub file: PathBuf,
}

/// Arguments for the reset command.
#[derive(Debug, Parser)]
pub struct ResetArgs {
    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the locate command.
#[derive(Debug, Parser)]
pub struct LocateArgs {
    /// Text-layer JSON: `[{"text", "x", "y", "width", "height"}, ...]`
    #[arg(short, long)]
    pub layer: PathBuf,

    /// Height of the simulated viewport
    #[arg(long, default_value = "800")]
    pub page_height: f64,

    /// Snippet to find
    #[arg(required = true, num_args = 1..)]
    pub snippet: Vec<String>,
}

impl LocateArgs {
    /// The snippet as a single string
    pub fn snippet(&self) -> String {
        self.snippet.join(" ")
    }
}

/// Arguments for profile management.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// Backend URL
        #[arg(short, long)]
        url: String,
        /// Text-layer dump directory
        #[arg(short, long)]
        text_layers: Option<PathBuf>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_repl() {
        let cli = Cli::parse_from(["pagecite"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["pagecite", "ask", "What", "is", "the", "termination", "clause?"]);
        match cli.command {
            Some(Command::Ask(args)) => assert_eq!(args.query(), "What is the termination clause?"),
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "pagecite",
            "health",
            "--server",
            "http://docs:8000",
            "-vv",
            "--format",
            "json",
        ]);
        assert_eq!(cli.server.as_deref(), Some("http://docs:8000"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(matches!(cli.command, Some(Command::Health)));
    }

    #[test]
    fn test_locate_command() {
        let cli = Cli::parse_from([
            "pagecite",
            "locate",
            "--layer",
            "page-4.json",
            "thirty",
            "days",
        ]);
        match cli.command {
            Some(Command::Locate(args)) => {
                assert_eq!(args.layer, PathBuf::from("page-4.json"));
                assert_eq!(args.page_height, 800.0);
                assert_eq!(args.snippet(), "thirty days");
            }
            _ => panic!("Expected Locate command"),
        }
    }

    #[test]
    fn test_reset_yes() {
        let cli = Cli::parse_from(["pagecite", "reset", "-y"]);
        assert!(matches!(cli.command, Some(Command::Reset(ResetArgs { yes: true }))));
    }

    #[test]
    fn test_ask_requires_query() {
        assert!(Cli::try_parse_from(["pagecite", "ask"]).is_err());
    }
}
