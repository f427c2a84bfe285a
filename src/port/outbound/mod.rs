//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the durable store and the external accrual
//! service.

pub mod accrual;
pub mod store;

pub use accrual::AccrualService;
pub use store::{BalanceLedger, OrderRegistry, UserDirectory};
