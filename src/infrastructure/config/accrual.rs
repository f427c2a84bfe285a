//! Accrual service client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Where and how to reach the external accrual service.
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualConfig {
    /// Base URL, e.g. `http://localhost:8081`. Overridden by `ACCRUAL_SYSTEM_ADDRESS`.
    #[serde(default)]
    pub base_url: String,
    /// Whole-request timeout (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// TCP connect timeout (milliseconds).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    5_000
}

const fn default_connect_timeout_ms() -> u64 {
    2_000
}

impl AccrualConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}
