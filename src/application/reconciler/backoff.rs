//! Explicit retry state for the reconciler.
//!
//! Delays are computed, not slept, here. The reconciler asks for the next
//! delay and performs the sleep itself, so the policy can be driven by a
//! paused tokio clock in tests.

use std::time::Duration;

use tokio::time::Instant;

use crate::infrastructure::config::reconciler::ReconcilerConfig;

/// Capped exponential backoff plus a global rate-limit pause.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial_ms: u64,
    max_ms: u64,
    multiplier: f64,
    /// Service errors since the last good answer.
    consecutive_failures: u32,
    /// Delay the next failure will wait.
    current_ms: u64,
    /// No queries before this instant.
    pause_until: Option<Instant>,
}

impl Backoff {
    #[must_use]
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        let initial_ms = u64::try_from(initial.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
        Self {
            initial_ms,
            max_ms: max_ms.max(initial_ms),
            multiplier: multiplier.max(1.0),
            consecutive_failures: 0,
            current_ms: initial_ms,
            pause_until: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &ReconcilerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.backoff_initial_ms),
            Duration::from_millis(config.backoff_max_ms),
            config.backoff_multiplier,
        )
    }

    /// Count a service error and return how long to wait before the next order.
    pub fn record_failure(&mut self) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let delay = Duration::from_millis(self.current_ms);
        let next_ms = (self.current_ms as f64 * self.multiplier) as u64;
        self.current_ms = next_ms.min(self.max_ms);
        delay
    }

    /// Any non-error answer from the service.
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
        self.current_ms = self.initial_ms;
    }

    /// Suspend all queries until `until`. A later pause already in force wins.
    pub fn pause_until(&mut self, until: Instant) {
        self.pause_until = Some(match self.pause_until {
            Some(existing) if existing > until => existing,
            _ => until,
        });
    }

    /// Time left on the pause at `now`, clearing it once expired.
    pub fn pause_remaining(&mut self, now: Instant) -> Option<Duration> {
        match self.pause_until {
            Some(until) if until > now => Some(until - now),
            Some(_) => {
                self.pause_until = None;
                None
            }
            None => None,
        }
    }

    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backoff() -> Backoff {
        Backoff::new(Duration::from_millis(100), Duration::from_millis(500), 2.0)
    }

    #[test]
    fn delays_double_then_cap() {
        let mut backoff = backoff();
        let delays: Vec<u128> = (0..5).map(|_| backoff.record_failure().as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 500, 500]);
        assert_eq!(backoff.consecutive_failures(), 5);
    }

    #[test]
    fn reset_restores_initial_delay() {
        let mut backoff = backoff();
        backoff.record_failure();
        backoff.record_failure();
        backoff.reset();
        assert_eq!(backoff.consecutive_failures(), 0);
        assert_eq!(backoff.record_failure(), Duration::from_millis(100));
    }

    #[test]
    fn multiplier_below_one_never_shrinks() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1), 0.5);
        backoff.record_failure();
        assert_eq!(backoff.record_failure(), Duration::from_millis(100));
    }

    #[test]
    fn pause_counts_down_and_clears() {
        let mut backoff = backoff();
        let now = Instant::now();
        backoff.pause_until(now + Duration::from_secs(2));

        assert_eq!(backoff.pause_remaining(now), Some(Duration::from_secs(2)));
        assert_eq!(
            backoff.pause_remaining(now + Duration::from_millis(1500)),
            Some(Duration::from_millis(500))
        );
        assert_eq!(backoff.pause_remaining(now + Duration::from_secs(2)), None);
        assert_eq!(backoff.pause_remaining(now), None);
    }

    #[test]
    fn longer_pause_wins() {
        let mut backoff = backoff();
        let now = Instant::now();
        backoff.pause_until(now + Duration::from_secs(5));
        backoff.pause_until(now + Duration::from_secs(1));
        assert_eq!(backoff.pause_remaining(now), Some(Duration::from_secs(5)));
    }
}
