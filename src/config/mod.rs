//! Configuration management.
//!
//! Settings come from built-in defaults, an optional TOML file and
//! `SCHOLAR_LENS_`-prefixed environment variables (nested keys use `__`),
//! in increasing order of precedence.
//!
//! ```toml
//! [scholar]
//! base_url = "https://scholar.google.com"
//! language = "en"
//! user_agent = "Mozilla/5.0 (Macintosh; ...)"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [ui]
//! copy_feedback_ms = 1000
//! color = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::fetch::{
    Endpoints, FetchError, Fetcher, HttpTransport, DEFAULT_BASE_URL, DEFAULT_LANGUAGE,
    DEFAULT_USER_AGENT,
};

/// Prefix for environment overrides, e.g. `SCHOLAR_LENS_SCHOLAR__LANGUAGE=de`
pub const ENV_PREFIX: &str = "SCHOLAR_LENS";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "scholar-lens.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scholar: ScholarConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

/// Where and how to talk to Scholar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Interface language passed as `hl`
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: default_language(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` for structured output, anything else for the compact text format
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

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Terminal presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long "Copied!" stays visible
    #[serde(default = "default_copy_feedback_ms")]
    pub copy_feedback_ms: u64,

    /// Force colours on or off; auto-detected when unset
    #[serde(default)]
    pub color: Option<bool>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            copy_feedback_ms: default_copy_feedback_ms(),
            color: None,
        }
    }
}

fn default_copy_feedback_ms() -> u64 {
    1000
}

impl Config {
    /// URL templates for the configured host and language
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.scholar.base_url, &self.scholar.language)
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.ui.copy_feedback_ms)
    }

    /// Build the reqwest transport with the configured timeouts
    pub fn transport(&self) -> Result<HttpTransport, FetchError> {
        HttpTransport::with_timeouts(
            Duration::from_secs(self.http.timeout_secs),
            Duration::from_secs(self.http.connect_timeout_secs),
        )
    }

    /// Build a fetcher over the real HTTP transport
    pub fn fetcher(&self) -> Result<Fetcher, FetchError> {
        Ok(
            Fetcher::new(Arc::new(self.transport()?), self.endpoints())
                .with_user_agent(&self.scholar.user_agent),
        )
    }

    /// Write this configuration as TOML
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Defaults plus environment overrides, for when no file exists
pub fn load_from_env() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(environment())
        .build()?
        .try_deserialize()
}

/// Default location of the user configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scholar-lens").join("config.toml"))
}

/// First existing config file: `./scholar-lens.toml`, then the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|p| p.is_file())
}
