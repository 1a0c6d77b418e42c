//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use pagecite_domain::viewer::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use pagecite_sdk::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS};
use pagecite_session::HighlightTiming;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub active_profile: String,

    /// Available profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// File this config was loaded from; `None` means the default location
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// Backend profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Chat backend URL
    pub server_url: String,

    /// Directory of text-layer dumps, `<dir>/<document stem>/page-<n>.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_layer_dir: Option<PathBuf>,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Command history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Pause between text-layer ready and highlighting
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Maximum wait for a text layer
    #[serde(default = "default_text_layer_timeout_ms")]
    pub text_layer_timeout_ms: u64,

    /// Maximum silence on an answer stream
    #[serde(default = "default_stream_idle_timeout_secs")]
    pub stream_idle_timeout_secs: u64,

    /// Initial zoom percent
    #[serde(default = "default_zoom")]
    pub default_zoom: u16,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".pagecite").join("config.toml"))
    }

    /// Directory holding config and REPL history.
    pub fn dir(&self) -> Result<PathBuf> {
        let path = match &self.source {
            Some(path) => path.clone(),
            None => Self::path()?,
        };
        Ok(path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Load configuration from `path`, falling back to defaults if missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str::<Config>(&contents)?
        } else {
            Self::default()
        };
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Save configuration to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = match &self.source {
            Some(path) => path.clone(),
            None => Self::path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Get the active profile.
    pub fn get_active_profile(&self) -> Result<&Profile> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", self.active_profile)))
    }

    /// Add or update a profile.
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Switch to a different profile.
    pub fn switch_profile(&mut self, name: String) -> Result<()> {
        if !self.profiles.contains_key(&name) {
            return Err(CliError::Config(format!("Profile '{}' does not exist", name)));
        }
        self.active_profile = name;
        Ok(())
    }
}

impl Settings {
    /// SDK tuning derived from the settings.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            stream_idle_timeout: Duration::from_secs(self.stream_idle_timeout_secs),
        }
    }

    /// Highlight timing derived from the settings.
    pub fn highlight_timing(&self) -> HighlightTiming {
        HighlightTiming {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            ready_timeout: Duration::from_millis(self.text_layer_timeout_ms),
        }
    }

    /// Configured zoom, clamped to the supported range.
    pub fn zoom(&self) -> u16 {
        self.default_zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "default".to_string(),
            Profile {
                server_url: DEFAULT_ENDPOINT.to_string(),
                text_layer_dir: None,
            },
        );

        Self {
            active_profile: "default".to_string(),
            profiles,
            settings: Settings::default(),
            source: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            history_size: default_history_size(),
            settle_delay_ms: default_settle_delay_ms(),
            text_layer_timeout_ms: default_text_layer_timeout_ms(),
            stream_idle_timeout_secs: default_stream_idle_timeout_secs(),
            default_zoom: DEFAULT_ZOOM,
        }
    }
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_history_size() -> usize {
    1000
}

fn default_settle_delay_ms() -> u64 {
    pagecite_session::highlight::DEFAULT_SETTLE_DELAY_MS
}

fn default_text_layer_timeout_ms() -> u64 {
    pagecite_session::highlight::DEFAULT_READY_TIMEOUT_MS
}

fn default_stream_idle_timeout_secs() -> u64 {
    pagecite_sdk::DEFAULT_STREAM_IDLE_TIMEOUT_SECS
}

fn default_zoom() -> u16 {
    DEFAULT_ZOOM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.active_profile, "default");
        assert_eq!(
            config.get_active_profile().unwrap().server_url,
            "http://localhost:8000"
        );
        assert!(config.settings.color);
        assert_eq!(config.settings.settle_delay_ms, 700);
        assert_eq!(config.settings.text_layer_timeout_ms, 5000);
        assert_eq!(config.settings.zoom(), 100);
    }

    #[test]
    fn test_profile_management() {
        let mut config = Config::default();

        let profile = Profile {
            server_url: "http://docs.internal:9000".to_string(),
            text_layer_dir: Some(PathBuf::from("/tmp/layers")),
        };

        config.set_profile("staging".to_string(), profile.clone());
        config.switch_profile("staging".to_string()).unwrap();
        assert_eq!(config.get_active_profile().unwrap(), &profile);
    }

    #[test]
    fn test_switch_to_nonexistent_profile() {
        let mut config = Config::default();
        let result = config.switch_profile("nonexistent".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            active_profile = "default"

            [profiles.default]
            server_url = "http://localhost:8000"

            [settings]
            format = "json"
            default_zoom = 400
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.format, OutputFormat::Json);
        assert_eq!(config.settings.history_size, 1000);
        assert_eq!(config.settings.zoom(), 200);
        assert_eq!(config.settings.highlight_timing(), HighlightTiming::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::load_from(&path).unwrap();
        config.settings.color = false;
        config.save().unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.settings.color);
        assert_eq!(loaded.dir().unwrap(), dir.path().join("nested"));
    }
}
