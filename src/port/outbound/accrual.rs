//! Accrual service port.

use std::future::Future;

use crate::domain::{AccrualOutcome, OrderNumber};

/// Query the external accrual service about one order.
///
/// Implementations never fail: every transport or protocol problem is
/// folded into [`AccrualOutcome::ServiceError`].
pub trait AccrualService: Send + Sync {
    /// Ask for the current verdict on `number`.
    fn query(&self, number: &OrderNumber) -> impl Future<Output = AccrualOutcome> + Send;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        "accrual"
    }
}
