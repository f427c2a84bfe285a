//! Accrual reconciler.
//!
//! Background service that settles pending orders against the external
//! accrual service. Each tick lists `NEW`/`PROCESSING` orders oldest first
//! and queries them one at a time.
//!
//! # Architecture
//!
//! ```text
//! interval ──tick──▶ AccrualReconciler ──query──▶ AccrualService
//!                          │    ▲
//!                          │    └── Backoff (failures, pause_until)
//!                          ▼
//!                    OrderRegistry::{mark_processing, apply_result}
//! ```
//!
//! Service errors back off exponentially and move on to the next order.
//! A rate limit stops the batch; the following tick waits out the pause
//! before querying anything. Orders are never given up on.

mod backoff;

pub use backoff::Backoff;

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::domain::{AccrualOutcome, ApplyOutcome, Order, OrderNumber, OrderStatus, Resolution};
use crate::infrastructure::config::reconciler::ReconcilerConfig;
use crate::port::outbound::{AccrualService, OrderRegistry};

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Orders queried.
    pub visited: usize,
    /// Terminal results written.
    pub applied: usize,
    /// Orders left pending (unregistered or still processing).
    pub deferred: usize,
    /// Service errors and storage failures.
    pub failed: usize,
    /// The batch was cut short by a rate limit.
    pub rate_limited: bool,
}

impl TickReport {
    /// Nothing was pending.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.visited == 0 && self.failed == 0 && !self.rate_limited
    }
}

/// Handle for controlling the reconciler lifecycle.
pub struct ReconcilerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Signal shutdown and wait for the current tick to finish.
    ///
    /// Pending sleeps are cut short; storage writes already started complete.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "Reconciler task ended abnormally");
        }
    }
}

/// Settles pending orders against the accrual service.
pub struct AccrualReconciler<R, A> {
    registry: R,
    accrual: A,
    config: ReconcilerConfig,
    backoff: Backoff,
    shutdown: watch::Receiver<bool>,
}

impl<R, A> AccrualReconciler<R, A>
where
    R: OrderRegistry,
    A: AccrualService,
{
    /// Create a reconciler that runs until its [`ReconcilerHandle`] says stop.
    pub fn new(registry: R, accrual: A, config: ReconcilerConfig) -> Self {
        let (_shutdown_tx, shutdown) = watch::channel(false);
        Self {
            registry,
            accrual,
            backoff: Backoff::from_config(&config),
            config,
            shutdown,
        }
    }

    /// Observe an externally owned shutdown signal instead.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Current retry state.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Spawn the reconciler onto the runtime.
    pub fn start(self) -> ReconcilerHandle
    where
        R: 'static,
        A: 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let reconciler = self.with_shutdown(shutdown_rx);
        let task = tokio::spawn(reconciler.run());
        ReconcilerHandle { shutdown_tx, task }
    }

    /// Tick on the configured interval until shutdown is signalled.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            service = self.accrual.name(),
            poll_interval_ms = self.config.poll_interval_ms,
            "Accrual reconciler started"
        );

        loop {
            tokio::select! {
                () = shutdown_requested(&mut self.shutdown) => break,
                _ = interval.tick() => {}
            }

            let report = self.tick().await;
            if report.is_idle() {
                debug!("No pending orders");
            } else {
                info!(
                    visited = report.visited,
                    applied = report.applied,
                    deferred = report.deferred,
                    failed = report.failed,
                    rate_limited = report.rate_limited,
                    "Reconciliation tick"
                );
            }
        }

        info!("Accrual reconciler stopped");
    }

    /// Run one pass over the pending orders.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        if let Some(wait) = self.backoff.pause_remaining(Instant::now()) {
            debug!(wait_ms = millis(wait), "Waiting out rate limit");
            if !self.sleep(wait).await {
                return report;
            }
        }

        let pending = match self.registry.list_pending().await {
            Ok(pending) => pending,
            Err(err) => {
                warn!(
                    error = %err,
                    transient = err.is_transient(),
                    "Failed to list pending orders"
                );
                report.failed += 1;
                return report;
            }
        };

        for order in pending {
            if self.is_shutdown() {
                break;
            }
            report.visited += 1;

            match self.query(&order.number).await {
                AccrualOutcome::Unregistered => {
                    self.backoff.reset();
                    report.deferred += 1;
                    debug!(order = %order.number, "Not yet known to accrual service");
                }
                AccrualOutcome::Pending => {
                    self.backoff.reset();
                    report.deferred += 1;
                    if order.status == OrderStatus::New && !self.mark_processing(&order).await {
                        report.failed += 1;
                    }
                }
                AccrualOutcome::Resolved(resolution) => {
                    self.backoff.reset();
                    match self.apply(&order, resolution).await {
                        Some(ApplyOutcome::Applied) => report.applied += 1,
                        Some(ApplyOutcome::Unchanged) => {}
                        None => report.failed += 1,
                    }
                }
                AccrualOutcome::RateLimited { retry_after } => {
                    let pause = retry_after
                        .unwrap_or_else(|| self.config.default_retry_after())
                        .min(self.config.max_retry_after());
                    let now = Instant::now();
                    let until = now
                        .checked_add(pause)
                        .or_else(|| now.checked_add(self.config.default_retry_after()))
                        .unwrap_or(now);
                    self.backoff.pause_until(until);
                    report.rate_limited = true;
                    warn!(
                        order = %order.number,
                        pause_ms = millis(pause),
                        "Accrual service rate limit, pausing all queries"
                    );
                    break;
                }
                AccrualOutcome::ServiceError { reason } => {
                    report.failed += 1;
                    let delay = self.backoff.record_failure();
                    warn!(
                        order = %order.number,
                        reason = %reason,
                        failures = self.backoff.consecutive_failures(),
                        delay_ms = millis(delay),
                        "Accrual service error, backing off"
                    );
                    if !self.sleep(delay).await {
                        break;
                    }
                }
            }
        }

        report
    }

    async fn query(&self, number: &OrderNumber) -> AccrualOutcome {
        let limit = self.config.query_timeout();
        match timeout(limit, self.accrual.query(number)).await {
            Ok(outcome) => outcome,
            Err(_) => AccrualOutcome::ServiceError {
                reason: format!("no answer within {} ms", limit.as_millis()),
            },
        }
    }

    async fn mark_processing(&self, order: &Order) -> bool {
        match self.registry.mark_processing(&order.number).await {
            Ok(outcome) => {
                if outcome == ApplyOutcome::Applied {
                    debug!(order = %order.number, "Order now processing");
                }
                true
            }
            Err(err) => {
                warn!(order = %order.number, error = %err, "Failed to mark order processing");
                false
            }
        }
    }

    async fn apply(&self, order: &Order, resolution: Resolution) -> Option<ApplyOutcome> {
        match self.registry.apply_result(&order.number, resolution).await {
            Ok(outcome) => Some(outcome),
            Err(err) if err.is_transient() => {
                warn!(
                    order = %order.number,
                    status = %resolution.status(),
                    error = %err,
                    "Failed to apply accrual result, retrying next tick"
                );
                None
            }
            Err(err) => {
                error!(
                    order = %order.number,
                    status = %resolution.status(),
                    error = %err,
                    "Accrual result rejected by the store"
                );
                None
            }
        }
    }

    fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleep unless shutdown arrives first. Returns false when interrupted.
    async fn sleep(&mut self, duration: Duration) -> bool {
        tokio::select! {
            () = tokio::time::sleep(duration) => true,
            () = shutdown_requested(&mut self.shutdown) => false,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Resolves once the flag reads true. A dropped sender means no shutdown
/// can ever arrive, so the future then stays pending.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
