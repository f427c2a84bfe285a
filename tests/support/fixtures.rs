//! Shared fixtures: order numbers and funded users over a `TempDb`.

use pointkeeper::adapter::outbound::sqlite::{SqliteOrderRegistry, SqliteUserDirectory};
use pointkeeper::domain::{OrderNumber, Resolution, UserId};
use pointkeeper::port::outbound::{OrderRegistry, UserDirectory};
use pointkeeper::testkit::db::TempDb;
use rust_decimal::Decimal;

/// Luhn-valid numbers, distinct from each other.
pub const NUMBERS: [&str; 6] = ["79927398713", "2377225624", "4561261212345467", "18", "26", "34"];

pub fn number(raw: &str) -> OrderNumber {
    OrderNumber::parse(raw).expect("valid order number")
}

pub async fn user(db: &TempDb, login: &str) -> UserId {
    SqliteUserDirectory::new(db.pool().clone())
        .create(login)
        .await
        .expect("create user")
}

/// A user credited with `points` through one processed order.
pub async fn funded_user(db: &TempDb, login: &str, order: &str, points: Decimal) -> UserId {
    let user = user(db, login).await;
    let registry = SqliteOrderRegistry::new(db.pool().clone());
    let n = number(order);
    registry.register(user, &n).await.expect("register order");
    registry
        .apply_result(&n, Resolution::Processed { accrual: points })
        .await
        .expect("apply result");
    user
}
