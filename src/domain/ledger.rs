//! Point ledger types.
//!
//! The ledger is append-only: a user's balance is always derived from the
//! sum of their entries and never stored as a mutable counter.
//!
//! Point amounts carry two decimal places. Storage keeps them as integer
//! hundredths so sums are exact; [`to_minor_units`] and [`from_minor_units`]
//! convert at the boundary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::DomainError;
use super::id::{OrderNumber, UserId};

/// Decimal places kept for point amounts.
pub const POINT_SCALE: u32 = 2;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Points credited for a processed order.
    Accrual,
    /// Points spent against a new order.
    Withdrawal,
}

impl EntryKind {
    /// Canonical storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accrual => "accrual",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accrual" => Ok(Self::Accrual),
            "withdrawal" => Ok(Self::Withdrawal),
            other => Err(DomainError::UnknownEntryKind(other.to_string())),
        }
    }
}

/// One immutable movement of points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub user_id: UserId,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub order: OrderNumber,
    pub created_at: DateTime<Utc>,
}

/// Derived balance of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balance {
    /// Accruals minus withdrawals.
    pub current: Decimal,
    /// Sum of all withdrawals.
    pub withdrawn: Decimal,
}

impl Balance {
    /// Fold a sequence of entries into a balance.
    ///
    /// Storage computes the same sums in SQL; this is the reference
    /// definition.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        entries
            .into_iter()
            .fold(Self::default(), |mut balance, entry| {
                match entry.kind {
                    EntryKind::Accrual => balance.current += entry.amount,
                    EntryKind::Withdrawal => {
                        balance.current -= entry.amount;
                        balance.withdrawn += entry.amount;
                    }
                }
                balance
            })
    }

    /// Build a balance from stored hundredths.
    #[must_use]
    pub fn from_minor_units(accrued: i64, withdrawn: i64) -> Self {
        Self {
            current: from_minor_units(accrued - withdrawn),
            withdrawn: from_minor_units(withdrawn),
        }
    }

    /// Returns true when `amount` can be withdrawn without going negative.
    #[must_use]
    pub fn covers(&self, amount: Decimal) -> bool {
        amount <= self.current
    }
}

/// A past withdrawal, as listed to its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Withdrawal {
    pub order: OrderNumber,
    pub sum: Decimal,
    pub processed_at: DateTime<Utc>,
}

/// Check that `amount` is representable at ledger scale.
///
/// # Errors
///
/// Returns [`DomainError::ExcessPrecision`] when the amount carries more
/// than [`POINT_SCALE`] significant decimal places. Amounts are never rounded.
pub fn check_scale(amount: Decimal) -> Result<Decimal, DomainError> {
    if amount.normalize().scale() > POINT_SCALE {
        return Err(DomainError::ExcessPrecision {
            amount,
            scale: POINT_SCALE,
        });
    }
    Ok(amount)
}

/// Convert a point amount to stored hundredths.
///
/// # Errors
///
/// [`DomainError::ExcessPrecision`] for sub-hundredth amounts,
/// [`DomainError::AmountOutOfRange`] when the value does not fit in `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, DomainError> {
    check_scale(amount)?
        .checked_mul(Decimal::from(10_i64.pow(POINT_SCALE)))
        .and_then(|scaled| scaled.to_i64())
        .ok_or(DomainError::AmountOutOfRange { amount })
}

/// Convert stored hundredths back to a point amount.
#[must_use]
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, POINT_SCALE)
}

/// Validate a withdrawal amount.
///
/// # Errors
///
/// Returns [`DomainError::NonPositiveAmount`] for zero or negative amounts
/// and [`DomainError::ExcessPrecision`] for sub-hundredth amounts.
pub fn positive_points(amount: Decimal) -> Result<Decimal, DomainError> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::NonPositiveAmount { amount });
    }
    check_scale(amount)
}
