//! Purchase orders and their accrual lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{OrderId, OrderNumber, UserId};

/// Accrual status of an order.
///
/// `New -> Processing -> {Processed | Invalid}`. The last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Registered, not yet seen by the accrual service.
    New,
    /// The accrual service is computing the reward.
    Processing,
    /// The accrual service rejected the order. No points are credited.
    Invalid,
    /// Reward computed and credited.
    Processed,
}

impl OrderStatus {
    /// Statuses the reconciler still has to drive to a terminal state.
    pub const PENDING: [OrderStatus; 2] = [OrderStatus::New, OrderStatus::Processing];

    /// Canonical storage/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Invalid => "INVALID",
            Self::Processed => "PROCESSED",
        }
    }

    /// Returns true for `Processed` and `Invalid`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }

    /// Returns true when an order in this status may move to `next`.
    ///
    /// Terminal states never change. `New` may skip straight to a terminal
    /// state, and re-applying the current pending status is not a transition.
    #[must_use]
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (Self::Invalid | Self::Processed, _) => false,
            (_, Self::New) => false,
            (Self::Processing, Self::Processing) => false,
            _ => true,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// A registered purchase order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    #[serde(skip)]
    pub id: OrderId,
    pub number: OrderNumber,
    #[serde(skip)]
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Present only once the order is `Processed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Decimal>,
    pub uploaded_at: DateTime<Utc>,
}

impl Order {
    /// Returns true while the reconciler still has work to do for this order.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Outcome of registering an order number for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    /// The number was free and now belongs to the caller.
    Registered,
    /// The caller already owns this number. Treated as a successful no-op.
    AlreadyOwnedBySameUser,
    /// Another user owns this number. The caller must reject the request.
    OwnedByOtherUser,
}

impl Registration {
    /// Returns true when the caller should report success.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Registered | Self::AlreadyOwnedBySameUser)
    }
}

/// Result of applying a reconciled status to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Status (and ledger, for `Processed`) changed.
    Applied,
    /// The order was already in that status or already terminal. Nothing written.
    Unchanged,
}
