//! SQLite persistence adapters.
//!
//! Implements the order registry, the point ledger and the user directory
//! over one shared Diesel connection pool. Cross-table writes (result
//! application, withdrawals) run inside `BEGIN IMMEDIATE` transactions, so
//! SQLite's single-writer lock serializes them.

mod codec;
pub mod database;
pub mod ledger;
pub mod order;
pub mod user;

pub use ledger::SqliteBalanceLedger;
pub use order::SqliteOrderRegistry;
pub use user::SqliteUserDirectory;
