//! User-facing loyalty operations.
//!
//! Resolves the caller's login to a user id, validates raw input into
//! domain types and delegates to the storage ports. Results are returned
//! as typed values; mapping them to exit codes or HTTP statuses is the
//! driving adapter's business.

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{Balance, Order, OrderNumber, Registration, UserId, Withdrawal};
use crate::error::Result;
use crate::port::outbound::{BalanceLedger, OrderRegistry, UserDirectory};

/// Order upload, history, balance and withdrawal for authenticated users.
pub struct LoyaltyService<R, L, U> {
    registry: R,
    ledger: L,
    users: U,
}

impl<R, L, U> LoyaltyService<R, L, U>
where
    R: OrderRegistry,
    L: BalanceLedger,
    U: UserDirectory,
{
    pub fn new(registry: R, ledger: L, users: U) -> Self {
        Self {
            registry,
            ledger,
            users,
        }
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// `LoginTaken` when the login exists, `EmptyLogin` for blank input.
    pub async fn register_user(&self, login: &str) -> Result<UserId> {
        let user = self.users.create(login).await?;
        info!(user = %user, login = login.trim(), "User registered");
        Ok(user)
    }

    /// Upload an order number for `login`.
    ///
    /// `OwnedByOtherUser` is returned, not raised; callers must treat it as
    /// a conflict.
    ///
    /// # Errors
    ///
    /// `InvalidOrderNumber` for malformed or checksum-failing input,
    /// `UserNotFound` for an unknown login.
    pub async fn upload_order(&self, login: &str, raw_number: &str) -> Result<Registration> {
        let number = OrderNumber::parse(raw_number)?;
        let user = self.users.resolve(login).await?;
        let registration = self.registry.register(user, &number).await?;
        info!(user = %user, order = %number, outcome = ?registration, "Order uploaded");
        Ok(registration)
    }

    /// Orders of `login`, oldest first.
    ///
    /// # Errors
    ///
    /// `UserNotFound` for an unknown login.
    pub async fn orders(&self, login: &str) -> Result<Vec<Order>> {
        let user = self.users.resolve(login).await?;
        self.registry.list_for_user(user).await
    }

    /// Current and withdrawn points of `login`.
    ///
    /// # Errors
    ///
    /// `UserNotFound` for an unknown login.
    pub async fn balance(&self, login: &str) -> Result<Balance> {
        let user = self.users.resolve(login).await?;
        self.ledger.balance(user).await
    }

    /// Spend `amount` points of `login` against a new order.
    ///
    /// # Errors
    ///
    /// `InvalidOrderNumber`, `NonPositiveAmount`, `InsufficientFunds`,
    /// `OrderAlreadyExists` or `UserNotFound`.
    pub async fn withdraw(&self, login: &str, raw_number: &str, amount: Decimal) -> Result<()> {
        let number = OrderNumber::parse(raw_number)?;
        let user = self.users.resolve(login).await?;
        self.ledger.withdraw(user, &number, amount).await
    }

    /// Withdrawals of `login`, newest first.
    ///
    /// # Errors
    ///
    /// `UserNotFound` for an unknown login.
    pub async fn withdrawals(&self, login: &str) -> Result<Vec<Withdrawal>> {
        let user = self.users.resolve(login).await?;
        self.ledger.withdrawals(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::{
        SqliteBalanceLedger, SqliteOrderRegistry, SqliteUserDirectory,
    };
    use crate::domain::{DomainError, OrderStatus, Resolution};
    use crate::error::{Error, LedgerError};
    use crate::testkit::db::TempDb;
    use rust_decimal_macros::dec;

    type Service = LoyaltyService<SqliteOrderRegistry, SqliteBalanceLedger, SqliteUserDirectory>;

    fn service(db: &TempDb) -> Service {
        LoyaltyService::new(
            SqliteOrderRegistry::new(db.pool().clone()),
            SqliteBalanceLedger::new(db.pool().clone()),
            SqliteUserDirectory::new(db.pool().clone()),
        )
    }

    #[tokio::test]
    async fn upload_rejects_bad_checksum_before_storage() {
        let db = TempDb::create("loyalty-luhn");
        let service = service(&db);
        service.register_user("alice").await.unwrap();

        let err = service.upload_order("alice", "79927398710").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::InvalidOrderNumber { .. })
        ));
        assert!(service.orders("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_for_unknown_login_is_not_found() {
        let db = TempDb::create("loyalty-unknown");
        let err = service(&db)
            .upload_order("ghost", "79927398713")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ledger(LedgerError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn conflict_and_resubmission() {
        let db = TempDb::create("loyalty-conflict");
        let service = service(&db);
        service.register_user("a").await.unwrap();
        service.register_user("b").await.unwrap();

        assert_eq!(
            service.upload_order("a", "79927398713").await.unwrap(),
            Registration::Registered
        );
        assert_eq!(
            service.upload_order("a", " 79927398713 ").await.unwrap(),
            Registration::AlreadyOwnedBySameUser
        );
        assert_eq!(
            service.upload_order("b", "79927398713").await.unwrap(),
            Registration::OwnedByOtherUser
        );

        let orders = service.orders("a").await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::New);
        assert!(service.orders("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn withdraw_after_accrual() {
        let db = TempDb::create("loyalty-withdraw");
        let service = service(&db);
        service.register_user("a").await.unwrap();
        service.upload_order("a", "79927398713").await.unwrap();

        SqliteOrderRegistry::new(db.pool().clone())
            .apply_result(
                &OrderNumber::parse("79927398713").unwrap(),
                Resolution::Processed {
                    accrual: dec!(100),
                },
            )
            .await
            .unwrap();

        service.withdraw("a", "2377225624", dec!(30)).await.unwrap();
        let err = service
            .withdraw("a", "18", dec!(500))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::InsufficientFunds { .. })
        ));

        let balance = service.balance("a").await.unwrap();
        assert_eq!(balance.current, dec!(70));
        assert_eq!(balance.withdrawn, dec!(30));
        assert_eq!(service.withdrawals("a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn withdraw_rejects_invalid_order_number() {
        let db = TempDb::create("loyalty-withdraw-luhn");
        let service = service(&db);
        service.register_user("a").await.unwrap();

        let err = service
            .withdraw("a", "12345", dec!(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Domain(DomainError::InvalidOrderNumber { .. })
        ));
    }
}
