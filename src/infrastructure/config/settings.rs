//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; `ACCRUAL_SYSTEM_ADDRESS` and
//! `DATABASE_URI` override the file so deployments can inject them.
//!
//! # Example
//!
//! ```no_run
//! use pointkeeper::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::accrual::AccrualConfig;
use super::logging::LoggingConfig;
use super::reconciler::ReconcilerConfig;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`AccrualConfig::base_url`].
pub const ACCRUAL_ADDRESS_ENV: &str = "ACCRUAL_SYSTEM_ADDRESS";
/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "DATABASE_URI";

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to SQLite database file.
    ///
    /// Defaults to "pointkeeper.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// External accrual service.
    #[serde(default)]
    pub accrual: AccrualConfig,

    /// Background reconciliation of pending orders.
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

fn default_database_path() -> String {
    "pointkeeper.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            logging: LoggingConfig::default(),
            accrual: AccrualConfig::default(),
            reconciler: ReconcilerConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content, apply environment overrides
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` when given, otherwise fall back to defaults plus
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    #[allow(clippy::result_large_err)]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::parse_toml(""),
        }
    }

    /// Replace file values with environment values where present.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup(ACCRUAL_ADDRESS_ENV).filter(|v| !v.trim().is_empty()) {
            self.accrual.base_url = address.trim().to_string();
        }
        if let Some(database) = lookup(DATABASE_ENV).filter(|v| !v.trim().is_empty()) {
            self.database = database.trim().to_string();
        }
    }

    /// Validate configuration values.
    ///
    /// The accrual URL may be empty here; commands that talk to the service
    /// call [`Config::require_accrual_url`].
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if !self.accrual.base_url.is_empty() {
            self.parsed_accrual_url()?;
        }
        if self.accrual.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let reconciler = &self.reconciler;
        if reconciler.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if reconciler.query_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "query_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if reconciler.backoff_initial_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_initial_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if reconciler.backoff_max_ms < reconciler.backoff_initial_ms {
            return Err(ConfigError::InvalidValue {
                field: "backoff_max_ms",
                reason: "must be >= backoff_initial_ms".to_string(),
            }
            .into());
        }
        if reconciler.max_retry_after_secs < reconciler.default_retry_after_secs {
            return Err(ConfigError::InvalidValue {
                field: "max_retry_after_secs",
                reason: "must be >= default_retry_after_secs".to_string(),
            }
            .into());
        }
        if reconciler.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be >= 1.0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// The accrual base URL, required and well-formed.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingField`] when unset, [`ConfigError::InvalidValue`]
    /// when it does not parse as an http(s) URL.
    #[allow(clippy::result_large_err)]
    pub fn require_accrual_url(&self) -> Result<Url> {
        if self.accrual.base_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "accrual.base_url",
            }
            .into());
        }
        self.parsed_accrual_url()
    }

    fn parsed_accrual_url(&self) -> Result<Url> {
        let url = Url::parse(&self.accrual.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "accrual.base_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "accrual.base_url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }
            .into());
        }
        Ok(url)
    }

    /// Database URL for the Diesel pool.
    #[must_use]
    pub fn database_url(&self) -> String {
        let database = self.database.as_str();
        if database == ":memory:"
            || database.starts_with("sqlite://")
            || database.starts_with("file:")
        {
            database.to_string()
        } else {
            format!("sqlite://{database}")
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
