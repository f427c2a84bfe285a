//! In-memory order registry.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::{
    ApplyOutcome, Order, OrderId, OrderNumber, OrderStatus, Registration, Resolution, UserId,
};
use crate::error::{LedgerError, Result};
use crate::port::outbound::store::OrderRegistry;

#[derive(Default)]
struct State {
    orders: Vec<Order>,
    credits: Vec<(OrderNumber, Decimal)>,
}

/// An [`OrderRegistry`] over a vector, for driving the reconciler under a
/// paused clock without touching SQLite.
///
/// Applied accruals are recorded as credits instead of ledger entries.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    inner: Arc<Mutex<State>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `numbers` for user 1, in order.
    pub fn with_orders(numbers: &[&OrderNumber]) -> Self {
        let registry = Self::new();
        for number in numbers {
            registry.insert(UserId::new(1), number);
        }
        registry
    }

    fn insert(&self, user: UserId, number: &OrderNumber) {
        let mut state = self.inner.lock();
        let id = OrderId::new(i32::try_from(state.orders.len()).unwrap_or(i32::MAX) + 1);
        state.orders.push(Order {
            id,
            number: number.clone(),
            user_id: user,
            status: OrderStatus::New,
            accrual: None,
            uploaded_at: Utc::now(),
        });
    }

    pub fn status(&self, number: &OrderNumber) -> Option<OrderStatus> {
        self.inner
            .lock()
            .orders
            .iter()
            .find(|o| &o.number == number)
            .map(|o| o.status)
    }

    /// Credited accruals, in application order.
    pub fn credits(&self) -> Vec<(OrderNumber, Decimal)> {
        self.inner.lock().credits.clone()
    }

    fn transition(
        &self,
        number: &OrderNumber,
        resolution: Option<Resolution>,
    ) -> Result<ApplyOutcome> {
        let mut state = self.inner.lock();
        let order = state
            .orders
            .iter_mut()
            .find(|o| &o.number == number)
            .ok_or_else(|| LedgerError::OrderNotFound {
                order: number.clone(),
            })?;

        let next = resolution.map_or(OrderStatus::Processing, |r| r.status());
        if !order.status.can_transition_to(next) {
            return Ok(ApplyOutcome::Unchanged);
        }
        order.status = next;
        order.accrual = resolution.and_then(|r| r.accrual());

        if let Some(accrual) = order.accrual.filter(|a| *a > Decimal::ZERO) {
            state.credits.push((number.clone(), accrual));
        }
        Ok(ApplyOutcome::Applied)
    }
}

impl OrderRegistry for MemoryRegistry {
    async fn register(&self, user: UserId, number: &OrderNumber) -> Result<Registration> {
        let owner = self
            .inner
            .lock()
            .orders
            .iter()
            .find(|o| &o.number == number)
            .map(|o| o.user_id);
        Ok(match owner {
            Some(owner) if owner == user => Registration::AlreadyOwnedBySameUser,
            Some(_) => Registration::OwnedByOtherUser,
            None => {
                self.insert(user, number);
                Registration::Registered
            }
        })
    }

    async fn list_pending(&self) -> Result<Vec<Order>> {
        Ok(self
            .inner
            .lock()
            .orders
            .iter()
            .filter(|o| o.is_pending())
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>> {
        Ok(self
            .inner
            .lock()
            .orders
            .iter()
            .filter(|o| o.user_id == user)
            .cloned()
            .collect())
    }

    async fn mark_processing(&self, number: &OrderNumber) -> Result<ApplyOutcome> {
        self.transition(number, None)
    }

    async fn apply_result(
        &self,
        number: &OrderNumber,
        resolution: Resolution,
    ) -> Result<ApplyOutcome> {
        self.transition(number, Some(resolution))
    }
}
