//! pagecite CLI - Chat with your PDFs from the terminal.

use clap::Parser;
use pagecite_cli::commands;
use pagecite_cli::repl;
use pagecite_cli::{Cli, Command, Config, Formatter};
use pagecite_domain::ViewerState;
use pagecite_sdk::PageciteClient;
use pagecite_session::ChatSession;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> pagecite_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let fresh = !config_path.exists();
    let mut config = Config::load_from(&config_path)?;
    if fresh {
        config.save().ok();
    }

    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let server = cli.server;
    match cli.command {
        None | Some(Command::Repl) => {
            let session = open_session(&config, server.as_deref())?;
            repl::run_repl(session, &config, &formatter).await?;
        }
        Some(Command::Ask(args)) => {
            let mut session = open_session(&config, server.as_deref())?;
            commands::execute_ask(args, &mut session, &formatter).await?;
        }
        Some(Command::Upload(args)) => {
            let session = open_session(&config, server.as_deref())?;
            commands::execute_upload(args, &session, &formatter).await?;
        }
        Some(Command::Reset(args)) => {
            let mut session = open_session(&config, server.as_deref())?;
            commands::execute_reset(args, &mut session, &formatter).await?;
        }
        Some(Command::Health) => {
            let client = connect(&config, server.as_deref())?;
            commands::execute_health(&client, &formatter).await?;
        }
        Some(Command::Locate(args)) => {
            commands::execute_locate(args, config.settings.zoom(), &formatter)?;
        }
        Some(Command::Profile(args)) => {
            commands::execute_profile(args, &mut config, &formatter)?;
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries answers only.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn connect(config: &Config, server: Option<&str>) -> pagecite_cli::Result<PageciteClient> {
    let url = match server {
        Some(url) => url.to_string(),
        None => config.get_active_profile()?.server_url.clone(),
    };
    tracing::debug!("Using backend {}", url);
    Ok(PageciteClient::with_config(&url, config.settings.client_config())?)
}

fn open_session(config: &Config, server: Option<&str>) -> pagecite_cli::Result<ChatSession> {
    let client = connect(config, server)?;
    Ok(ChatSession::with_viewer(
        client,
        ViewerState::new(config.settings.zoom()),
    ))
}
