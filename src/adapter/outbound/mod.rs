//! Outbound adapters (driven side).

pub mod accrual;
pub mod sqlite;
