//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`db`] - `TempDb`, a migrated SQLite file removed on drop.
//! - [`accrual`] - `ScriptedAccrual`, an [`AccrualService`](crate::port::outbound::AccrualService)
//!   that replays canned outcomes and records when it was asked.
//! - [`registry`] - `MemoryRegistry`, an in-memory order registry.
//! - [`config`] - Canonical reconciler and client configurations.

pub mod accrual;
pub mod config;
pub mod db;
pub mod registry;
