mod support;

use pointkeeper::adapter::outbound::sqlite::{SqliteBalanceLedger, SqliteOrderRegistry};
use pointkeeper::domain::{OrderStatus, Registration};
use pointkeeper::error::{Error, LedgerError};
use pointkeeper::port::outbound::{BalanceLedger, OrderRegistry};
use pointkeeper::testkit::db::TempDb;
use rust_decimal_macros::dec;

use support::fixtures::{funded_user, number, user};

#[tokio::test]
async fn withdrawal_registers_a_processed_order() {
    let db = TempDb::create("it-ledger-order");
    let alice = funded_user(&db, "alice", "79927398713", dec!(729.98)).await;
    let ledger = SqliteBalanceLedger::new(db.pool().clone());
    let registry = SqliteOrderRegistry::new(db.pool().clone());

    ledger
        .withdraw(alice, &number("2377225624"), dec!(100.01))
        .await
        .unwrap();

    let orders = registry.list_for_user(alice).await.unwrap();
    let spent = orders
        .iter()
        .find(|o| o.number == number("2377225624"))
        .unwrap();
    assert_eq!(spent.status, OrderStatus::Processed);
    assert_eq!(spent.accrual, None);

    let balance = ledger.balance(alice).await.unwrap();
    assert_eq!(balance.current, dec!(629.97));
    assert_eq!(balance.withdrawn, dec!(100.01));
}

#[tokio::test]
async fn order_used_for_withdrawal_cannot_be_uploaded_by_anyone_else() {
    let db = TempDb::create("it-ledger-upload-after");
    let alice = funded_user(&db, "alice", "79927398713", dec!(50)).await;
    let bob = user(&db, "bob").await;
    let ledger = SqliteBalanceLedger::new(db.pool().clone());
    let registry = SqliteOrderRegistry::new(db.pool().clone());

    ledger.withdraw(alice, &number("18"), dec!(5)).await.unwrap();

    assert_eq!(
        registry.register(bob, &number("18")).await.unwrap(),
        Registration::OwnedByOtherUser
    );
}

#[tokio::test]
async fn exact_balance_can_be_withdrawn_then_nothing_more() {
    let db = TempDb::create("it-ledger-exact");
    let alice = funded_user(&db, "alice", "79927398713", dec!(25)).await;
    let ledger = SqliteBalanceLedger::new(db.pool().clone());

    ledger.withdraw(alice, &number("18"), dec!(25)).await.unwrap();
    let err = ledger
        .withdraw(alice, &number("26"), dec!(0.01))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Ledger(LedgerError::InsufficientFunds { available, .. }) if available == dec!(0)
    ));
    assert_eq!(ledger.withdrawals(alice).await.unwrap().len(), 1);
}

#[tokio::test]
async fn balances_are_per_user() {
    let db = TempDb::create("it-ledger-per-user");
    let alice = funded_user(&db, "alice", "79927398713", dec!(10)).await;
    let bob = funded_user(&db, "bob", "4561261212345467", dec!(20)).await;
    let ledger = SqliteBalanceLedger::new(db.pool().clone());

    ledger.withdraw(bob, &number("18"), dec!(15)).await.unwrap();

    assert_eq!(ledger.balance(alice).await.unwrap().current, dec!(10));
    assert_eq!(ledger.balance(bob).await.unwrap().current, dec!(5));
    assert!(ledger.withdrawals(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn balance_survives_reopening_the_store() {
    let db = TempDb::create("it-ledger-reopen");
    let alice = funded_user(&db, "alice", "79927398713", dec!(80)).await;
    SqliteBalanceLedger::new(db.pool().clone())
        .withdraw(alice, &number("18"), dec!(30))
        .await
        .unwrap();

    let url = format!("sqlite://{}", db.path().display());
    let pool = pointkeeper::adapter::outbound::sqlite::database::connection::create_pool(&url)
        .unwrap();
    let balance = SqliteBalanceLedger::new(pool).balance(alice).await.unwrap();

    assert_eq!(balance.current, dec!(50));
    assert_eq!(balance.withdrawn, dec!(30));
}
