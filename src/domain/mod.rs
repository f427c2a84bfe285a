//! Storage-agnostic domain types.
//!
//! - [`id`] - `UserId`, `OrderId` and the Luhn-validated `OrderNumber`
//! - [`order`] - orders, their status machine and registration outcomes
//! - [`ledger`] - ledger entries, derived balances, point arithmetic
//! - [`accrual`] - the sealed answer type of the accrual service
//! - [`error`] - invariant violations

pub mod accrual;
pub mod error;
pub mod id;
pub mod ledger;
pub mod order;

pub use accrual::{AccrualOutcome, Resolution};
pub use error::DomainError;
pub use id::{OrderId, OrderNumber, UserId};
pub use ledger::{Balance, EntryKind, LedgerEntry, Withdrawal};
pub use order::{ApplyOutcome, Order, OrderStatus, Registration};
