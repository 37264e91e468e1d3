//! Configuration management for the census dashboard

use crate::{Error, Result, standards::Thresholds};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Prefix of environment overrides, e.g. `SENSUS__API__BASE_URL`
pub const ENV_PREFIX: &str = "SENSUS";

/// Separator between prefix and nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Data-fetch behaviour
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Indicator thresholds
    #[serde(default)]
    pub standards: StandardsConfig,

    /// Report export
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the version prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Bearer token forwarded verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Data-fetch behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Seconds before an execution is cancelled with a timeout error
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Run once on mount
    #[serde(default = "default_immediate")]
    pub immediate: bool,
}

/// Indicator threshold configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StandardsConfig {
    /// Full table override; the built-in table when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,

    /// Pull optimal ranges from `GET /standards/medical` on start
    #[serde(default)]
    pub sync_remote: bool,
}

/// Report export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory downloaded reports are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

const fn default_timeout_seconds() -> u64 {
    30
}

const fn default_immediate() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./exports")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            auth_token: None,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a duration
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            immediate: default_immediate(),
        }
    }
}

impl FetchConfig {
    /// Execution timeout as a duration
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file and the environment
    ///
    /// Without an explicit path, `sensus.{toml,yaml,json}` in the working
    /// directory is used when present. Environment variables override files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("sensus").required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            Error::configuration(format!("api.base_url '{}' is invalid: {e}", self.api.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration(format!(
                "api.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.api.timeout_seconds == 0 {
            return Err(Error::configuration("api.timeout_seconds must be positive"));
        }
        if self.fetch.timeout_seconds == 0 {
            return Err(Error::configuration("fetch.timeout_seconds must be positive"));
        }

        if !matches!(self.logging.format.to_ascii_lowercase().as_str(), "pretty" | "json") {
            return Err(Error::configuration(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }

        if let Some(thresholds) = &self.standards.thresholds {
            thresholds.validate()?;
        }

        Ok(())
    }

    /// The threshold table in effect before any remote sync
    pub fn thresholds(&self) -> Thresholds {
        self.standards.thresholds.unwrap_or_default()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
