//! Scripted accrual service.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::domain::{AccrualOutcome, OrderNumber};
use crate::port::outbound::AccrualService;

/// One recorded query.
#[derive(Debug, Clone)]
pub struct Query {
    pub number: OrderNumber,
    pub at: Instant,
}

#[derive(Default)]
struct Script {
    per_order: HashMap<OrderNumber, VecDeque<AccrualOutcome>>,
    queries: Vec<Query>,
    latency: Duration,
}

/// An [`AccrualService`] that replays queued outcomes per order number.
///
/// When an order's queue runs dry the service answers
/// [`AccrualOutcome::Pending`]. Clones share the same script, so a test can
/// keep a handle after moving one into the reconciler.
#[derive(Clone, Default)]
pub struct ScriptedAccrual {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedAccrual {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `outcomes` for `number`, answered in order.
    pub fn with(self, number: &OrderNumber, outcomes: Vec<AccrualOutcome>) -> Self {
        self.push(number, outcomes);
        self
    }

    /// Answer every query only after `latency` has passed.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.inner.lock().latency = latency;
        self
    }

    pub fn push(&self, number: &OrderNumber, outcomes: Vec<AccrualOutcome>) {
        self.inner
            .lock()
            .per_order
            .entry(number.clone())
            .or_default()
            .extend(outcomes);
    }

    /// Every query so far, in call order.
    pub fn queries(&self) -> Vec<Query> {
        self.inner.lock().queries.clone()
    }

    /// Instants at which `number` was queried.
    pub fn queried_at(&self, number: &OrderNumber) -> Vec<Instant> {
        self.inner
            .lock()
            .queries
            .iter()
            .filter(|q| &q.number == number)
            .map(|q| q.at)
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.inner.lock().queries.len()
    }
}

impl AccrualService for ScriptedAccrual {
    async fn query(&self, number: &OrderNumber) -> AccrualOutcome {
        let (outcome, latency) = {
            let mut script = self.inner.lock();
            script.queries.push(Query {
                number: number.clone(),
                at: Instant::now(),
            });
            let outcome = script
                .per_order
                .get_mut(number)
                .and_then(VecDeque::pop_front)
                .unwrap_or(AccrualOutcome::Pending);
            (outcome, script.latency)
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        outcome
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
