//! Application configuration module
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `VILLAGESYNC_*` environment variables.
//!
//! ```toml
//! api_url = "http://localhost:3000"
//! status_policy = "transport-only"
//! request_timeout_secs = 10
//!
//! [store]
//! kind = "sqlite"
//! path = "/var/lib/villagesync/queue.db"
//!
//! [probe]
//! path = "/api/health"
//! interval_secs = 15
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::sync::transport::StatusPolicy;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default name of the slot holding the pending list
pub const DEFAULT_SLOT: &str = "offlineQueue";

const ENV_API_URL: &str = "VILLAGESYNC_API_URL";
const ENV_STORE: &str = "VILLAGESYNC_STORE";
const ENV_STORE_PATH: &str = "VILLAGESYNC_STORE_PATH";
const ENV_STATUS_POLICY: &str = "VILLAGESYNC_STATUS_POLICY";
const ENV_TIMEOUT_SECS: &str = "VILLAGESYNC_TIMEOUT_SECS";

/// Application configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL relative record urls are resolved against
    pub api_url: String,
    /// Where the pending list is persisted
    pub store: StoreConfig,
    /// How replay responses are classified
    pub status_policy: StatusPolicy,
    /// Per-request timeout; the HTTP client's defaults apply when unset
    pub request_timeout_secs: Option<u64>,
    /// Connectivity probe settings
    pub probe: ProbeConfig,
    /// Drain once when the trigger starts and the network is already up
    pub drain_on_start: bool,
}

/// Persistent action store settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Slot file or database path; a per-user data directory when unset
    pub path: Option<PathBuf>,
    pub slot: String,
}

/// Store backend selection
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// JSON slot file
    #[default]
    File,
    /// Row in a local SQLite database
    Sqlite,
    /// In-process only, lost on exit
    Memory,
}

/// Connectivity probe settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    pub path: String,
    pub interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            store: StoreConfig::default(),
            status_policy: StatusPolicy::default(),
            request_timeout_secs: None,
            probe: ProbeConfig::default(),
            drain_on_start: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: None,
            slot: DEFAULT_SLOT.to_string(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            interval_secs: 15,
        }
    }
}

impl std::str::FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::invalid("store.kind", format!("unknown store kind '{}'", other))),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from an optional TOML file plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text; missing keys keep their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        Ok(config)
    }

    /// Override values from environment variables, looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(kind) = lookup(ENV_STORE) {
            self.store.kind = kind.parse()?;
        }
        if let Some(path) = lookup(ENV_STORE_PATH) {
            self.store.path = Some(PathBuf::from(path));
        }
        if let Some(policy) = lookup(ENV_STATUS_POLICY) {
            self.status_policy = policy.parse()?;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid("request_timeout_secs", e.to_string()))?;
            self.request_timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.api_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                self.api_url
            )));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::invalid("request_timeout_secs", "timeout must be positive"));
        }
        if self.probe.interval_secs == 0 {
            return Err(ConfigError::invalid("probe.interval_secs", "interval must be positive"));
        }
        if self.store.slot.trim().is_empty() {
            return Err(ConfigError::MissingValue("store.slot"));
        }
        Ok(())
    }

    /// The parsed API base URL
    pub fn api_base(&self) -> Result<reqwest::Url, ConfigError> {
        reqwest::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.api_url, e)))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe.interval_secs)
    }

    /// Store path, falling back to the platform data directory
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.store.path {
            return path.clone();
        }
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("villagesync");
        match self.store.kind {
            StoreKind::Sqlite => path.push("offline_queue.db"),
            _ => path.push("offline_queue.json"),
        }
        path
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the API base URL
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn store_kind(mut self, kind: StoreKind) -> Self {
        self.config.store.kind = kind;
        self
    }

    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.path = Some(path.into());
        self
    }

    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.config.store.slot = slot.into();
        self
    }

    pub fn status_policy(mut self, policy: StatusPolicy) -> Self {
        self.config.status_policy = policy;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn probe(mut self, path: impl Into<String>, interval_secs: u64) -> Self {
        self.config.probe = ProbeConfig {
            path: path.into(),
            interval_secs,
        };
        self
    }

    pub fn drain_on_start(mut self, enabled: bool) -> Self {
        self.config.drain_on_start = enabled;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            message: message.into(),
        }
    }
}
