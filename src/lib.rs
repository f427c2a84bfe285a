//! Pointkeeper - loyalty points ledger with accrual reconciliation.
//!
//! Users upload purchase order numbers; an external accrual service decides
//! how many points each order earns; a background reconciler settles those
//! decisions into an append-only point ledger that users can spend from.
//!
//! # Architecture
//!
//! - **`domain`** - Order numbers (Luhn-checked), order lifecycle, ledger
//!   entries and derived balances, accrual outcomes
//! - **`port`** - Storage and accrual-service traits
//! - **`adapter`** - SQLite (Diesel) stores, the reqwest accrual client and
//!   the operator CLI
//! - **`application`** - `LoyaltyService` and `AccrualReconciler`
//! - **`infrastructure`** - Configuration, logging, wiring, process lifecycle
//!
//! # Modules
//!
//! - [`domain`] - Pure types and invariants
//! - [`error`] - Error types for the crate
//! - [`port`] - Hexagonal ports
//! - [`adapter`] - Port implementations
//! - [`application`] - Services
//! - [`infrastructure`] - Config and bootstrap
//!
//! # Features
//!
//! - `testkit` - Expose scripted fakes and temp databases to integration tests
//!
//! # Example
//!
//! ```no_run
//! use pointkeeper::infrastructure::bootstrap;
//! use pointkeeper::infrastructure::config::settings::Config;
//!
//! # async fn demo() -> pointkeeper::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let pool = bootstrap::open_store(&config)?;
//! let service = bootstrap::build_loyalty_service(&pool);
//! let balance = service.balance("alice").await?;
//! println!("{}", balance.current);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
