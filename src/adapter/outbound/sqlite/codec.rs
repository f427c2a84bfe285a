//! Row <-> domain conversions shared by the SQLite adapters.

use chrono::{DateTime, SecondsFormat, Utc};

use super::database::model::{LedgerEntryRow, OrderRow};
use crate::domain::ledger::from_minor_units;
use crate::domain::{Order, OrderId, OrderNumber, UserId, Withdrawal};
use crate::error::{Error, Result};

/// Fixed-width RFC 3339 so lexical order equals time order.
pub(super) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("bad timestamp '{raw}': {e}")))
}

pub(super) fn order_from_row(row: OrderRow) -> Result<Order> {
    Ok(Order {
        id: OrderId::new(row.id),
        number: OrderNumber::parse(&row.order_number)?,
        user_id: UserId::new(row.user_id),
        status: row.status.parse()?,
        accrual: row.accrual_minor.map(from_minor_units),
        uploaded_at: parse_timestamp(&row.uploaded_at)?,
    })
}

pub(super) fn withdrawal_from_row(row: LedgerEntryRow) -> Result<Withdrawal> {
    Ok(Withdrawal {
        order: OrderNumber::parse(&row.order_number)?,
        sum: from_minor_units(row.amount_minor),
        processed_at: parse_timestamp(&row.created_at)?,
    })
}
