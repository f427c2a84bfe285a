//! Accrual reconciler scheduling and backoff configuration.

use std::time::Duration;

use serde::Deserialize;

/// Reconciler timing.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerConfig {
    /// Run the reconciler inside `pointkeeper run`.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Delay between ticks (milliseconds).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on one accrual query (milliseconds). Expiry counts as a service error.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    /// Pause used when a 429 carries no usable `Retry-After` (seconds).
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,
    /// Longest pause honored from a `Retry-After` header (seconds). Larger values are clamped.
    #[serde(default = "default_max_retry_after_secs")]
    pub max_retry_after_secs: u64,
    /// First backoff delay after a service error (milliseconds).
    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,
    /// Backoff ceiling (milliseconds).
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    /// Growth factor per consecutive failure.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

const fn default_enabled() -> bool {
    true
}

const fn default_poll_interval_ms() -> u64 {
    1_000
}

const fn default_query_timeout_ms() -> u64 {
    10_000
}

const fn default_retry_after_secs() -> u64 {
    1
}

const fn default_max_retry_after_secs() -> u64 {
    300
}

const fn default_backoff_initial_ms() -> u64 {
    500
}

const fn default_backoff_max_ms() -> u64 {
    30_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

impl ReconcilerConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    #[must_use]
    pub const fn default_retry_after(&self) -> Duration {
        Duration::from_secs(self.default_retry_after_secs)
    }

    #[must_use]
    pub const fn max_retry_after(&self) -> Duration {
        Duration::from_secs(self.max_retry_after_secs)
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_ms: default_poll_interval_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            default_retry_after_secs: default_retry_after_secs(),
            max_retry_after_secs: default_max_retry_after_secs(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}
