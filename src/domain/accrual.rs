//! Answers from the external accrual service.

use std::time::Duration;

use rust_decimal::Decimal;

use super::order::OrderStatus;

/// Final verdict of the accrual service on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The order earns `accrual` points (possibly zero).
    Processed { accrual: Decimal },
    /// The order earns nothing and will never be reconsidered.
    Invalid,
}

impl Resolution {
    /// Order status this resolution drives the order to.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        match self {
            Self::Processed { .. } => OrderStatus::Processed,
            Self::Invalid => OrderStatus::Invalid,
        }
    }

    /// Points to credit, if any.
    #[must_use]
    pub const fn accrual(&self) -> Option<Decimal> {
        match self {
            Self::Processed { accrual } => Some(*accrual),
            Self::Invalid => None,
        }
    }
}

/// Everything a single accrual query can yield.
///
/// Transport failures, timeouts and unexpected responses all arrive as
/// [`AccrualOutcome::ServiceError`]; nothing here is fatal to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccrualOutcome {
    /// The service has not seen the order yet.
    Unregistered,
    /// The service knows the order and is still computing.
    Pending,
    /// The service reached a final verdict.
    Resolved(Resolution),
    /// Too many requests. `retry_after` is absent when the header was missing or malformed.
    RateLimited { retry_after: Option<Duration> },
    /// Anything else: 5xx, timeouts, undecodable bodies.
    ServiceError { reason: String },
}

impl AccrualOutcome {
    /// Short label for structured logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::Pending => "pending",
            Self::Resolved(Resolution::Processed { .. }) => "processed",
            Self::Resolved(Resolution::Invalid) => "invalid",
            Self::RateLimited { .. } => "rate_limited",
            Self::ServiceError { .. } => "service_error",
        }
    }
}
