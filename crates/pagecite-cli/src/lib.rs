//! pagecite CLI library.
//!
//! This library provides the core functionality for the pagecite command-line
//! interface: configuration profiles, command execution, the terminal text
//! layer and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod layer;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
