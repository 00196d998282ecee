//! Application configuration.
//!
//! Read from an optional TOML file. Every field has a default so an empty
//! or missing file yields a playable setup.

use crate::games::tictactoe::Difficulty;
use crate::series::SeriesConfig;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable overriding [`ClientConfig::api_base`].
pub const API_URL_ENV: &str = "GATO_API_URL";

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "gato.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Series rules.
    #[serde(default)]
    series: SeriesConfig,

    /// Front-end settings.
    #[serde(default)]
    client: ClientConfig,

    /// Move service settings.
    #[serde(default)]
    server: ServerConfig,

    /// Persisted state.
    #[serde(default)]
    storage: StorageConfig,

    /// How long a notice stays up, in milliseconds.
    #[serde(default = "default_notice_ttl_ms")]
    notice_ttl_ms: u64,
}

/// Front-end settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of a remote move service. Local play when absent.
    #[serde(default)]
    api_base: Option<String>,

    /// Bound on a single CPU request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,

    /// Starting difficulty.
    #[serde(default)]
    difficulty: Difficulty,
}

/// Move service settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Hard-tier answers served before falling back to medium.
    #[serde(default)]
    hard_budget: Option<u32>,
}

/// Persisted state settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct StorageConfig {
    /// State file location.
    #[serde(default = "default_storage_path")]
    path: PathBuf,
}

fn default_notice_ttl_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("gato_state.json")
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            series: SeriesConfig::default(),
            client: ClientConfig::default(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            notice_ttl_ms: default_notice_ttl_ms(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            request_timeout_ms: default_request_timeout_ms(),
            difficulty: Difficulty::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            hard_budget: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl ClientConfig {
    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            max_rounds = config.series.max_rounds(),
            wins_to_take = config.series.wins_to_take(),
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        let api_base = config.client.api_base.take();
        config.set_api_base(api_base);
        Ok(config)
    }

    /// Loads `path` if it exists, defaults otherwise, then applies the
    /// environment override.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            debug!("No config file, using defaults");
            Self::default()
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.set_api_base(Some(url));
        }
        Ok(config)
    }

    /// Rejects unusable limits.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.series
            .validate()
            .map_err(|e| ConfigError::new(e.message))?;
        if self.client.request_timeout_ms == 0 {
            return Err(ConfigError::new(
                "request_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the remote service URL. Blank values select local play.
    pub fn set_api_base(&mut self, url: Option<String>) {
        self.client.api_base = url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
    }

    /// Sets the starting difficulty.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.client.difficulty = difficulty;
    }

    /// Sets the state file location.
    pub fn set_storage_path(&mut self, path: PathBuf) {
        self.storage.path = path;
    }

    /// Notice lifetime as a duration.
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
