//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                  ┌──────────────────────────┐
//!   CLI ─────────▶ │  LoyaltyService          │
//!                  │  AccrualReconciler       │
//!                  └──────┬─────────────┬─────┘
//!                         ▼             ▼
//!                  ┌────────────┐ ┌───────────────┐
//!                  │  SQLite    │ │ Accrual HTTP  │
//!                  │  adapters  │ │ adapter       │
//!                  └────────────┘ └───────────────┘
//! ```

pub mod outbound;
