//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated.
//! These errors are returned by `parse`/`try_new` constructors that validate
//! inputs before they reach storage.
//!
//! # Examples
//!
//! ```
//! use pointkeeper::domain::error::DomainError;
//! use pointkeeper::domain::id::OrderNumber;
//!
//! // 79927398710 fails the Luhn checksum
//! let result = OrderNumber::parse("79927398710");
//! assert!(matches!(result, Err(DomainError::InvalidOrderNumber { .. })));
//! ```

use thiserror::Error;

use super::order::OrderStatus;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Order numbers must be non-empty decimal strings passing the Luhn check.
    #[error("invalid order number '{number}'")]
    InvalidOrderNumber {
        /// The rejected input.
        number: String,
    },

    /// Withdrawals and accruals must move a positive amount of points.
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The invalid amount that was provided.
        amount: rust_decimal::Decimal,
    },

    /// Amount does not fit the ledger's fixed-point representation.
    #[error("amount {amount} is out of range")]
    AmountOutOfRange {
        /// The amount that overflowed.
        amount: rust_decimal::Decimal,
    },

    /// Points are kept in hundredths; finer amounts are rejected, not rounded.
    #[error("amount {amount} has more than {scale} decimal places")]
    ExcessPrecision {
        /// The rejected amount.
        amount: rust_decimal::Decimal,
        /// Decimal places the ledger keeps.
        scale: u32,
    },

    /// Logins must contain at least one non-whitespace character.
    #[error("login must not be empty")]
    EmptyLogin,

    /// Stored or received status string is not a known order status.
    #[error("unknown order status '{0}'")]
    UnknownStatus(String),

    /// Stored entry kind is neither `accrual` nor `withdrawal`.
    #[error("unknown ledger entry kind '{0}'")]
    UnknownEntryKind(String),

    /// The requested status change would leave a terminal state or go backwards.
    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
}
