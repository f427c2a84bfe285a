//! Accrual service wire types.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Body of a `200 OK` answer.
#[derive(Debug, Deserialize)]
pub struct OrderAccrualResponse {
    pub order: String,
    pub status: RemoteStatus,
    #[serde(default)]
    pub accrual: Option<Decimal>,
}

/// Status vocabulary of the accrual service.
///
/// Differs from ours: the service says `REGISTERED` where we say `NEW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}
