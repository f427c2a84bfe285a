//! Application services.
//!
//! - [`loyalty`] - the operations exposed to users: order upload, order
//!   history, balance, withdrawal.
//! - [`reconciler`] - the background task that settles pending orders
//!   against the accrual service.

pub mod loyalty;
pub mod reconciler;

pub use loyalty::LoyaltyService;
pub use reconciler::{AccrualReconciler, ReconcilerHandle, TickReport};
