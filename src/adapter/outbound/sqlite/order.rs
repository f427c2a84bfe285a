//! SQLite order registry.
//!
//! Order numbers are protected by a `UNIQUE` constraint. Registration
//! inserts with `ON CONFLICT DO NOTHING` and only reads the existing owner
//! when the insert lost, so uniqueness is decided by the storage engine and
//! never by a read-then-write race.

use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::codec::{order_from_row, timestamp};
use super::database::connection::{run_blocking, DbPool};
use super::database::model::{NewLedgerEntryRow, NewOrderRow, OrderRow};
use super::database::schema::orders;
use super::ledger::append_entry;
use crate::domain::ledger::to_minor_units;
use crate::domain::{
    ApplyOutcome, DomainError, EntryKind, Order, OrderNumber, OrderStatus, Registration,
    Resolution, UserId,
};
use crate::error::{Error, LedgerError, Result};
use crate::port::outbound::store::OrderRegistry;

/// SQLite-backed [`OrderRegistry`].
#[derive(Clone)]
pub struct SqliteOrderRegistry {
    pool: DbPool,
}

impl SqliteOrderRegistry {
    /// Create a new registry over the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Insert an order unless its number is taken. Returns rows inserted (0 or 1).
pub(super) fn insert_order(conn: &mut SqliteConnection, row: &NewOrderRow) -> Result<usize> {
    diesel::insert_into(orders::table)
        .values(row)
        .on_conflict(orders::order_number)
        .do_nothing()
        .execute(conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                LedgerError::UnknownUser {
                    user: UserId::new(row.user_id),
                }
                .into()
            }
            other => Error::from(other),
        })
}

fn find_by_number(conn: &mut SqliteConnection, number: &OrderNumber) -> Result<OrderRow> {
    orders::table
        .filter(orders::order_number.eq(number.as_str()))
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| {
            LedgerError::OrderNotFound {
                order: number.clone(),
            }
            .into()
        })
}

/// Conditionally move `row` to `next`.
///
/// The `status = current` guard makes a repeated delivery a no-op even if
/// two writers raced past the transition check.
fn transition(
    conn: &mut SqliteConnection,
    row: &OrderRow,
    next: OrderStatus,
    accrual_minor: Option<i64>,
) -> Result<ApplyOutcome> {
    let current: OrderStatus = row.status.parse()?;
    if !current.can_transition_to(next) {
        return Ok(ApplyOutcome::Unchanged);
    }

    let updated = diesel::update(
        orders::table
            .filter(orders::id.eq(row.id))
            .filter(orders::status.eq(current.as_str())),
    )
    .set((
        orders::status.eq(next.as_str()),
        orders::accrual_minor.eq(accrual_minor),
    ))
    .execute(conn)?;

    Ok(if updated == 1 {
        ApplyOutcome::Applied
    } else {
        ApplyOutcome::Unchanged
    })
}

impl OrderRegistry for SqliteOrderRegistry {
    async fn register(&self, user: UserId, number: &OrderNumber) -> Result<Registration> {
        let number = number.clone();
        let registration = run_blocking(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| -> Result<Registration> {
                let row = NewOrderRow {
                    order_number: number.as_str().to_string(),
                    user_id: user.value(),
                    status: OrderStatus::New.as_str().to_string(),
                    accrual_minor: None,
                    uploaded_at: timestamp(Utc::now()),
                };
                if insert_order(conn, &row)? == 1 {
                    return Ok(Registration::Registered);
                }

                let owner = find_by_number(conn, &number)?.user_id;
                Ok(if owner == user.value() {
                    Registration::AlreadyOwnedBySameUser
                } else {
                    Registration::OwnedByOtherUser
                })
            })
        })
        .await?;

        debug!(user = %user, outcome = ?registration, "Order registration");
        Ok(registration)
    }

    async fn list_pending(&self) -> Result<Vec<Order>> {
        run_blocking(&self.pool, |conn| {
            let pending: Vec<&str> = OrderStatus::PENDING.iter().map(OrderStatus::as_str).collect();
            let rows: Vec<OrderRow> = orders::table
                .filter(orders::status.eq_any(pending))
                .order(orders::id.asc())
                .select(OrderRow::as_select())
                .load(conn)?;
            rows.into_iter().map(order_from_row).collect()
        })
        .await
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>> {
        run_blocking(&self.pool, move |conn| {
            let rows: Vec<OrderRow> = orders::table
                .filter(orders::user_id.eq(user.value()))
                .order(orders::id.asc())
                .select(OrderRow::as_select())
                .load(conn)?;
            rows.into_iter().map(order_from_row).collect()
        })
        .await
    }

    async fn mark_processing(&self, number: &OrderNumber) -> Result<ApplyOutcome> {
        let number = number.clone();
        run_blocking(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| -> Result<ApplyOutcome> {
                let row = find_by_number(conn, &number)?;
                transition(conn, &row, OrderStatus::Processing, None)
            })
        })
        .await
    }

    async fn apply_result(
        &self,
        number: &OrderNumber,
        resolution: Resolution,
    ) -> Result<ApplyOutcome> {
        let number = number.clone();
        if let Some(amount) = resolution.accrual().filter(Decimal::is_sign_negative) {
            return Err(DomainError::NonPositiveAmount { amount }.into());
        }
        let accrual_minor = resolution.accrual().map(to_minor_units).transpose()?;

        let log_number = number.clone();
        let outcome = run_blocking(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| -> Result<ApplyOutcome> {
                let row = find_by_number(conn, &number)?;
                let outcome = transition(conn, &row, resolution.status(), accrual_minor)?;

                if outcome == ApplyOutcome::Applied {
                    if let Some(minor) = accrual_minor.filter(|m| *m > 0) {
                        append_entry(
                            conn,
                            &NewLedgerEntryRow {
                                user_id: row.user_id,
                                kind: EntryKind::Accrual.as_str().to_string(),
                                amount_minor: minor,
                                order_number: row.order_number.clone(),
                                created_at: timestamp(Utc::now()),
                            },
                        )?;
                    }
                }
                Ok(outcome)
            })
        })
        .await?;

        if outcome == ApplyOutcome::Applied {
            info!(
                order = %log_number,
                status = %resolution.status(),
                accrual = ?resolution.accrual(),
                "Accrual result applied"
            );
        }
        Ok(outcome)
    }
}
