//! Configuration for the monitoring service and notification center.
//!
//! Configuration is read from an optional TOML file and can be overridden
//! with environment variables of the form `STAYFRONT__<SECTION>__<KEY>`,
//! e.g. `STAYFRONT__MONITORING__MODE=production`.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "STAYFRONT";

/// Whether the application runs as a development or production build.
///
/// Development builds log captured errors locally; production builds forward
/// them to the configured sink instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    #[default]
    Development,
    Production,
}

impl RuntimeMode {
    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeMode::Production)
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeMode::Development => write!(f, "development"),
            RuntimeMode::Production => write!(f, "production"),
        }
    }
}

/// Settings for the error monitoring service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Development or production behaviour
    #[serde(default)]
    pub mode: RuntimeMode,
    /// Build version stamped onto every report
    #[serde(default = "default_build_version")]
    pub build_version: String,
    /// Maximum number of reports retained in memory
    #[serde(default = "default_max_reports")]
    pub max_reports: usize,
    /// Ingestion endpoint for production forwarding
    #[serde(default)]
    pub sink_endpoint: Option<String>,
    /// Timeout for a single forwarding request
    #[serde(default = "default_sink_timeout_ms")]
    pub sink_timeout_ms: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::default(),
            build_version: default_build_version(),
            max_reports: default_max_reports(),
            sink_endpoint: None,
            sink_timeout_ms: default_sink_timeout_ms(),
        }
    }
}

impl MonitoringConfig {
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_build_version(mut self, version: impl Into<String>) -> Self {
        self.build_version = version.into();
        self
    }

    pub fn with_max_reports(mut self, max_reports: usize) -> Self {
        self.max_reports = max_reports;
        self
    }

    pub fn with_sink_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.sink_endpoint = Some(endpoint.into());
        self
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_ms)
    }
}

fn default_build_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_max_reports() -> usize {
    100
}

fn default_sink_timeout_ms() -> u64 {
    5000
}

/// Settings for the notification center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Auto-dismiss delay for notifications that do not set one
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: u64,
    /// Maximum number of visible notifications; unbounded when absent
    #[serde(default)]
    pub max_visible: Option<usize>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: default_duration_ms(),
            max_visible: None,
        }
    }
}

impl NotificationConfig {
    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = Some(max_visible);
        self
    }

    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms)
    }
}

fn default_duration_ms() -> u64 {
    5000
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayfrontConfig {
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl StayfrontConfig {
    /// Load configuration from a TOML file with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, the path is not valid
    /// UTF-8, or the merged configuration cannot be deserialized.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| ConfigError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::with_name(path_str))
            .add_source(Self::environment())
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load configuration from environment overrides only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::builder().add_source(Self::environment()).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load from `path` when given, otherwise from the environment only.
    pub fn load_or_env<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::from_env(),
        }
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
