//! Configuration system for credmatch
//!
//! Loads configuration from a TOML file.

mod types;

pub use types::*;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Accepted values for `logging.level`
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main credmatch configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Settings store location
    pub settings: SettingsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Load the default configuration file, falling back to defaults when it
    /// is missing or unreadable
    pub async fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).await.unwrap_or_default()
    }

    /// Load configuration from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            settings: raw.settings.unwrap_or_default().into(),
            logging: raw.logging.unwrap_or_default().try_into()?,
        })
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Get the default settings store path
    pub fn default_settings_path() -> PathBuf {
        Self::config_dir().join("settings.toml")
    }

    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("credmatch")
    }

    /// Contents of a new configuration file
    pub fn template() -> String {
        format!(
            r#"# credmatch configuration

[settings]
path = '{}'

[logging]
level = "info"
format = "pretty"
"#,
            Self::default_settings_path().display()
        )
    }
}

/// Settings store configuration
#[derive(Debug, Clone)]
pub struct SettingsConfig {
    /// Path to the settings file
    pub path: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: Config::default_settings_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format
    Json,
}
