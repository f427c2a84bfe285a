//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::infrastructure::config::accrual::AccrualConfig;
use crate::infrastructure::config::reconciler::ReconcilerConfig;

/// Reconciler config with round numbers that are easy to assert on under
/// a paused clock.
pub fn reconciler() -> ReconcilerConfig {
    ReconcilerConfig {
        enabled: true,
        poll_interval_ms: 1_000,
        query_timeout_ms: 5_000,
        default_retry_after_secs: 1,
        max_retry_after_secs: 60,
        backoff_initial_ms: 100,
        backoff_max_ms: 1_600,
        backoff_multiplier: 2.0,
    }
}

/// Client config pointing at `base_url` with short timeouts.
pub fn accrual(base_url: &str) -> AccrualConfig {
    AccrualConfig {
        base_url: base_url.to_string(),
        timeout_ms: 2_000,
        connect_timeout_ms: 500,
    }
}
