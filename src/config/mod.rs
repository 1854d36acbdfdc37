//! Configuration management.

mod file_config;

pub use file_config::{ConfigFileError, CONFIG_FILE_NAME};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::models::ExportFormat;
use crate::sources::{INSPIRE_API_BASE, INSPIRE_SITE_BASE};
use crate::state::DisplayConfig;
use crate::utils::DEFAULT_TIMEOUT_SECS;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Literature index settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Presentation constants
    #[serde(default)]
    pub display: DisplayConfig,

    /// Typesetting engine
    #[serde(default)]
    pub typeset: TypesetConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Check that configured URLs parse and limits are usable
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        for (key, value) in [
            ("index.api_base", &self.index.api_base),
            ("index.site_base", &self.index.site_base),
            ("index.profile_url", &self.index.profile_url),
        ] {
            Url::parse(value)
                .map_err(|e| config::ConfigError::Message(format!("{}: {}", key, e)))?;
        }
        if self.index.query.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "index.query must not be empty".to_string(),
            ));
        }
        if self.index.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "index.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Literature index settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// REST API base
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Base for record permalinks
    #[serde(default = "default_site_base")]
    pub site_base: String,

    /// Search expression selecting the author
    #[serde(default = "default_query")]
    pub query: String,

    /// Full publication list for the author
    #[serde(default = "default_profile_url")]
    pub profile_url: String,

    /// Citation-export format fetched per record
    #[serde(default)]
    pub export_format: ExportFormat,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            site_base: default_site_base(),
            query: default_query(),
            profile_url: default_profile_url(),
            export_format: ExportFormat::default(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_api_base() -> String {
    INSPIRE_API_BASE.to_string()
}

fn default_site_base() -> String {
    INSPIRE_SITE_BASE.to_string()
}

fn default_query() -> String {
    "a Edward.Hirst.1".to_string()
}

fn default_profile_url() -> String {
    "https://inspirehep.net/authors/1791403".to_string()
}

fn default_user_agent() -> String {
    crate::utils::default_user_agent()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// External typesetting engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypesetConfig {
    /// Program to run; unset disables typesetting
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` for structured output, anything else for plain text
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from an optional file plus `RESEARCH_FEED_*` environment overrides.
///
/// Nested keys use `__`, e.g. `RESEARCH_FEED_INDEX__QUERY`.
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("RESEARCH_FEED")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Get the default configuration
pub fn get_config() -> Config {
    Config::default()
}

/// Locate a configuration file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("research-feed").join("config.toml"))
        .filter(|path| path.is_file())
}
