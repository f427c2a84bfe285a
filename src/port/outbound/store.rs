//! Persistence ports for orders, the point ledger and users.
//!
//! All three are views over one durable store. Operations that touch both
//! orders and ledger entries run in a single transaction inside the adapter.

use std::future::Future;

use rust_decimal::Decimal;

use crate::domain::{
    ApplyOutcome, Balance, Order, OrderNumber, Registration, Resolution, UserId, Withdrawal,
};
use crate::error::Result;

/// Order identity and ownership.
pub trait OrderRegistry: Send + Sync {
    /// Register `number` for `user`.
    ///
    /// The existence check and the insert are one indivisible step, so two
    /// concurrent uploads of the same number can never both see `Registered`.
    fn register(
        &self,
        user: UserId,
        number: &OrderNumber,
    ) -> impl Future<Output = Result<Registration>> + Send;

    /// Orders in `NEW` or `PROCESSING`, oldest first.
    fn list_pending(&self) -> impl Future<Output = Result<Vec<Order>>> + Send;

    /// All orders of a user, oldest first.
    fn list_for_user(&self, user: UserId) -> impl Future<Output = Result<Vec<Order>>> + Send;

    /// Move a pending order to `PROCESSING`.
    ///
    /// Returns [`ApplyOutcome::Unchanged`] if it was already processing or terminal.
    fn mark_processing(
        &self,
        number: &OrderNumber,
    ) -> impl Future<Output = Result<ApplyOutcome>> + Send;

    /// Apply a terminal verdict.
    ///
    /// For [`Resolution::Processed`] with a positive accrual the ledger entry
    /// is appended in the same transaction as the status change. Applying to
    /// an order that is already terminal writes nothing.
    ///
    /// # Errors
    ///
    /// [`LedgerError::OrderNotFound`](crate::error::LedgerError::OrderNotFound)
    /// for unknown numbers.
    fn apply_result(
        &self,
        number: &OrderNumber,
        resolution: Resolution,
    ) -> impl Future<Output = Result<ApplyOutcome>> + Send;
}

/// Derived balances and withdrawals.
pub trait BalanceLedger: Send + Sync {
    /// Current and withdrawn totals, derived from entries.
    fn balance(&self, user: UserId) -> impl Future<Output = Result<Balance>> + Send;

    /// Spend `amount` points against a new order `number`.
    ///
    /// Balance check, order registration (status `PROCESSED`) and the
    /// withdrawal entry commit together or not at all.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientFunds`](crate::error::LedgerError::InsufficientFunds)
    /// or [`LedgerError::OrderAlreadyExists`](crate::error::LedgerError::OrderAlreadyExists).
    fn withdraw(
        &self,
        user: UserId,
        number: &OrderNumber,
        amount: Decimal,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Withdrawals of a user, newest first.
    fn withdrawals(&self, user: UserId) -> impl Future<Output = Result<Vec<Withdrawal>>> + Send;
}

/// Identity resolution for authenticated principals.
pub trait UserDirectory: Send + Sync {
    /// Create a user. Fails with `LoginTaken` when the login exists.
    fn create(&self, login: &str) -> impl Future<Output = Result<UserId>> + Send;

    /// Resolve a login to its stable id. Fails with `UserNotFound`.
    fn resolve(&self, login: &str) -> impl Future<Output = Result<UserId>> + Send;
}
