//! SQLite point ledger.
//!
//! Entries are append-only (triggers reject UPDATE and DELETE). Balances are
//! summed in SQL from integer hundredths on every read.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::codec::{timestamp, withdrawal_from_row};
use super::database::connection::{run_blocking, DbPool};
use super::database::model::{BalanceSums, LedgerEntryRow, NewLedgerEntryRow, NewOrderRow};
use super::database::schema::ledger_entries;
use super::order::insert_order;
use crate::domain::ledger::{positive_points, to_minor_units};
use crate::domain::{Balance, EntryKind, OrderNumber, OrderStatus, UserId, Withdrawal};
use crate::error::{LedgerError, Result};
use crate::port::outbound::store::BalanceLedger;

const BALANCE_SQL: &str = "\
    SELECT \
        COALESCE(SUM(CASE WHEN kind = 'accrual' THEN amount_minor ELSE 0 END), 0) AS accrued, \
        COALESCE(SUM(CASE WHEN kind = 'withdrawal' THEN amount_minor ELSE 0 END), 0) AS withdrawn \
    FROM ledger_entries WHERE user_id = ?";

/// SQLite-backed [`BalanceLedger`].
#[derive(Clone)]
pub struct SqliteBalanceLedger {
    pool: DbPool,
}

impl SqliteBalanceLedger {
    /// Create a new ledger over the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Append one entry. Callers own the surrounding transaction.
pub(super) fn append_entry(conn: &mut SqliteConnection, row: &NewLedgerEntryRow) -> Result<()> {
    diesel::insert_into(ledger_entries::table)
        .values(row)
        .execute(conn)?;
    Ok(())
}

fn load_sums(conn: &mut SqliteConnection, user: UserId) -> Result<BalanceSums> {
    Ok(diesel::sql_query(BALANCE_SQL)
        .bind::<Integer, _>(user.value())
        .get_result(conn)?)
}

impl BalanceLedger for SqliteBalanceLedger {
    async fn balance(&self, user: UserId) -> Result<Balance> {
        let sums = run_blocking(&self.pool, move |conn| load_sums(conn, user)).await?;
        Ok(Balance::from_minor_units(sums.accrued, sums.withdrawn))
    }

    async fn withdraw(&self, user: UserId, number: &OrderNumber, amount: Decimal) -> Result<()> {
        let sum = positive_points(amount)?;
        let minor = to_minor_units(sum)?;
        let number = number.clone();
        let log_number = number.clone();

        run_blocking(&self.pool, move |conn| {
            // IMMEDIATE takes the write lock before the balance read, so two
            // withdrawals for one user cannot both pass the check.
            conn.immediate_transaction(|conn| -> Result<()> {
                let sums = load_sums(conn, user)?;
                let balance = Balance::from_minor_units(sums.accrued, sums.withdrawn);
                if !balance.covers(sum) {
                    return Err(LedgerError::InsufficientFunds {
                        requested: sum,
                        available: balance.current,
                    }
                    .into());
                }

                let now = timestamp(Utc::now());
                let order = NewOrderRow {
                    order_number: number.as_str().to_string(),
                    user_id: user.value(),
                    status: OrderStatus::Processed.as_str().to_string(),
                    accrual_minor: None,
                    uploaded_at: now.clone(),
                };
                if insert_order(conn, &order)? == 0 {
                    return Err(LedgerError::OrderAlreadyExists { order: number }.into());
                }

                append_entry(
                    conn,
                    &NewLedgerEntryRow {
                        user_id: user.value(),
                        kind: EntryKind::Withdrawal.as_str().to_string(),
                        amount_minor: minor,
                        order_number: number.as_str().to_string(),
                        created_at: now,
                    },
                )
            })
        })
        .await?;

        info!(user = %user, order = %log_number, sum = %sum, "Points withdrawn");
        Ok(())
    }

    async fn withdrawals(&self, user: UserId) -> Result<Vec<Withdrawal>> {
        let rows = run_blocking(&self.pool, move |conn| {
            Ok(ledger_entries::table
                .filter(ledger_entries::user_id.eq(user.value()))
                .filter(ledger_entries::kind.eq(EntryKind::Withdrawal.as_str()))
                .order(ledger_entries::id.desc())
                .select(LedgerEntryRow::as_select())
                .load::<LedgerEntryRow>(conn)?)
        })
        .await?;

        debug!(user = %user, count = rows.len(), "Loaded withdrawals");
        rows.into_iter().map(withdrawal_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::{SqliteOrderRegistry, SqliteUserDirectory};
    use crate::domain::{DomainError, Resolution};
    use crate::error::Error;
    use crate::port::outbound::store::{OrderRegistry, UserDirectory};
    use crate::testkit::db::TempDb;
    use rust_decimal_macros::dec;

    fn number(raw: &str) -> OrderNumber {
        OrderNumber::parse(raw).unwrap()
    }

    /// A user credited with `points` through a processed order.
    async fn funded_user(db: &TempDb, login: &str, order: &str, points: Decimal) -> UserId {
        let user = SqliteUserDirectory::new(db.pool().clone())
            .create(login)
            .await
            .unwrap();
        let registry = SqliteOrderRegistry::new(db.pool().clone());
        let n = number(order);
        registry.register(user, &n).await.unwrap();
        registry
            .apply_result(&n, Resolution::Processed { accrual: points })
            .await
            .unwrap();
        user
    }

    #[tokio::test]
    async fn new_user_has_zero_balance() {
        let db = TempDb::create("ledger-zero");
        let user = SqliteUserDirectory::new(db.pool().clone())
            .create("alice")
            .await
            .unwrap();
        let ledger = SqliteBalanceLedger::new(db.pool().clone());

        assert_eq!(ledger.balance(user).await.unwrap(), Balance::default());
        assert!(ledger.withdrawals(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn withdraw_updates_balance_and_history() {
        let db = TempDb::create("ledger-withdraw");
        let user = funded_user(&db, "alice", "79927398713", dec!(100)).await;
        let ledger = SqliteBalanceLedger::new(db.pool().clone());

        ledger
            .withdraw(user, &number("2377225624"), dec!(30))
            .await
            .unwrap();

        let balance = ledger.balance(user).await.unwrap();
        assert_eq!(balance.current, dec!(70));
        assert_eq!(balance.withdrawn, dec!(30));

        let history = ledger.withdrawals(user).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].order, number("2377225624"));
        assert_eq!(history[0].sum, dec!(30));
    }

    #[tokio::test]
    async fn insufficient_funds_leaves_ledger_untouched() {
        let db = TempDb::create("ledger-insufficient");
        let user = funded_user(&db, "alice", "79927398713", dec!(200)).await;
        let ledger = SqliteBalanceLedger::new(db.pool().clone());
        let registry = SqliteOrderRegistry::new(db.pool().clone());

        let err = ledger
            .withdraw(user, &number("2377225624"), dec!(500))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::InsufficientFunds { requested, available })
                if requested == dec!(500) && available == dec!(200)
        ));

        assert_eq!(ledger.balance(user).await.unwrap().current, dec!(200));
        assert!(ledger.withdrawals(user).await.unwrap().is_empty());
        assert_eq!(registry.list_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn withdraw_against_existing_order_is_rejected() {
        let db = TempDb::create("ledger-existing-order");
        let user = funded_user(&db, "alice", "79927398713", dec!(200)).await;
        let ledger = SqliteBalanceLedger::new(db.pool().clone());

        let err = ledger
            .withdraw(user, &number("79927398713"), dec!(10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::OrderAlreadyExists { .. })
        ));
        assert_eq!(ledger.balance(user).await.unwrap().withdrawn, dec!(0));
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let db = TempDb::create("ledger-non-positive");
        let user = funded_user(&db, "alice", "79927398713", dec!(10)).await;
        let ledger = SqliteBalanceLedger::new(db.pool().clone());

        for amount in [dec!(0), dec!(-5), dec!(0.001)] {
            let err = ledger
                .withdraw(user, &number("2377225624"), amount)
                .await
                .unwrap_err();
            assert!(err.is_rejection());
        }
    }

    #[tokio::test]
    async fn sub_hundredth_withdrawal_is_rejected_not_rounded() {
        let db = TempDb::create("ledger-precision");
        let user = funded_user(&db, "alice", "79927398713", dec!(200)).await;
        let ledger = SqliteBalanceLedger::new(db.pool().clone());

        let err = ledger
            .withdraw(user, &number("2377225624"), dec!(200.004))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::ExcessPrecision { amount, .. }) if amount == dec!(200.004)
        ));

        let balance = ledger.balance(user).await.unwrap();
        assert_eq!(balance.current, dec!(200));
        assert_eq!(balance.withdrawn, dec!(0));
        assert!(ledger.withdrawals(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn trailing_zeros_are_not_excess_precision() {
        let db = TempDb::create("ledger-trailing-zeros");
        let user = funded_user(&db, "alice", "79927398713", dec!(20)).await;
        let ledger = SqliteBalanceLedger::new(db.pool().clone());

        ledger
            .withdraw(user, &number("2377225624"), dec!(10.5000))
            .await
            .unwrap();
        assert_eq!(ledger.balance(user).await.unwrap().current, dec!(9.5));
    }

    #[tokio::test]
    async fn stored_entries_are_append_only() {
        let db = TempDb::create("ledger-append-only");
        let user = funded_user(&db, "alice", "79927398713", dec!(50)).await;
        let mut conn = db.pool().get().unwrap();

        assert!(diesel::sql_query("UPDATE ledger_entries SET amount_minor = 1")
            .execute(&mut conn)
            .is_err());
        assert!(diesel::sql_query("DELETE FROM ledger_entries")
            .execute(&mut conn)
            .is_err());

        let second_accrual = NewLedgerEntryRow {
            user_id: user.value(),
            kind: EntryKind::Accrual.as_str().to_string(),
            amount_minor: 5_000,
            order_number: "79927398713".to_string(),
            created_at: timestamp(Utc::now()),
        };
        assert!(append_entry(&mut conn, &second_accrual).is_err());
        drop(conn);

        let ledger = SqliteBalanceLedger::new(db.pool().clone());
        assert_eq!(ledger.balance(user).await.unwrap().current, dec!(50));
    }

    #[tokio::test]
    async fn withdrawals_are_listed_newest_first() {
        let db = TempDb::create("ledger-order");
        let user = funded_user(&db, "alice", "79927398713", dec!(100)).await;
        let ledger = SqliteBalanceLedger::new(db.pool().clone());

        ledger.withdraw(user, &number("2377225624"), dec!(10)).await.unwrap();
        ledger.withdraw(user, &number("18"), dec!(20)).await.unwrap();

        let orders: Vec<_> = ledger
            .withdrawals(user)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.order)
            .collect();
        assert_eq!(orders, vec![number("18"), number("2377225624")]);
    }

    #[tokio::test]
    async fn concurrent_withdrawals_never_overdraw() {
        let db = TempDb::create("ledger-race");
        let user = funded_user(&db, "alice", "79927398713", dec!(100)).await;

        let numbers = ["2377225624", "18", "26", "34", "42", "59"];
        let mut handles = Vec::new();
        for raw in numbers {
            let ledger = SqliteBalanceLedger::new(db.pool().clone());
            let n = number(raw);
            handles.push(tokio::spawn(async move {
                ledger.withdraw(user, &n, dec!(30)).await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => succeeded += 1,
                Err(Error::Ledger(LedgerError::InsufficientFunds { .. })) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        let balance = SqliteBalanceLedger::new(db.pool().clone())
            .balance(user)
            .await
            .unwrap();
        assert_eq!(succeeded, 3);
        assert_eq!(balance.current, dec!(10));
        assert_eq!(balance.withdrawn, dec!(90));
    }
}
