//! External accrual service adapter.
//!
//! Talks to `GET {base}/api/orders/{number}` and folds every response,
//! including transport failures, into an [`AccrualOutcome`](crate::domain::AccrualOutcome).

mod client;
mod dto;

pub use client::AccrualClient;
