//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{ledger_entries, orders, users};

/// Database row for a user (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub login: String,
    pub created_at: String,
}

/// Database row for an order (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub order_number: String,
    pub user_id: i32,
    pub status: String,
    pub accrual_minor: Option<i64>,
    pub uploaded_at: String,
}

/// Database row for an order (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub id: i32,
    pub order_number: String,
    pub user_id: i32,
    pub status: String,
    pub accrual_minor: Option<i64>,
    pub uploaded_at: String,
}

/// Database row for a ledger entry (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = ledger_entries)]
pub struct NewLedgerEntryRow {
    pub user_id: i32,
    pub kind: String,
    pub amount_minor: i64,
    pub order_number: String,
    pub created_at: String,
}

/// Database row for a ledger entry (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntryRow {
    pub id: i32,
    pub user_id: i32,
    pub kind: String,
    pub amount_minor: i64,
    pub order_number: String,
    pub created_at: String,
}

/// Aggregated ledger sums for one user, in hundredths.
#[derive(QueryableByName, Debug, Clone, Copy, Default)]
pub struct BalanceSums {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub accrued: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub withdrawn: i64,
}
