//! SQLite user directory.

use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use super::codec::timestamp;
use super::database::connection::{run_blocking, DbPool};
use super::database::model::NewUserRow;
use super::database::schema::users;
use crate::domain::{DomainError, UserId};
use crate::error::{Error, LedgerError, Result};
use crate::port::outbound::store::UserDirectory;

/// SQLite-backed [`UserDirectory`].
#[derive(Clone)]
pub struct SqliteUserDirectory {
    pool: DbPool,
}

impl SqliteUserDirectory {
    /// Create a new directory over the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn normalize_login(login: &str) -> Result<String> {
    let login = login.trim();
    if login.is_empty() {
        return Err(DomainError::EmptyLogin.into());
    }
    Ok(login.to_string())
}

impl UserDirectory for SqliteUserDirectory {
    async fn create(&self, login: &str) -> Result<UserId> {
        let login = normalize_login(login)?;
        run_blocking(&self.pool, move |conn| {
            let row = NewUserRow {
                login: login.clone(),
                created_at: timestamp(Utc::now()),
            };
            diesel::insert_into(users::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| match e {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        Error::from(LedgerError::LoginTaken {
                            login: login.clone(),
                        })
                    }
                    other => Error::from(other),
                })?;
            let id = users::table
                .filter(users::login.eq(&login))
                .select(users::id)
                .first::<i32>(conn)?;
            Ok(UserId::new(id))
        })
        .await
    }

    async fn resolve(&self, login: &str) -> Result<UserId> {
        let login = login.trim().to_string();
        run_blocking(&self.pool, move |conn| {
            users::table
                .filter(users::login.eq(&login))
                .select(users::id)
                .first::<i32>(conn)
                .optional()?
                .map(UserId::new)
                .ok_or_else(|| LedgerError::UserNotFound { login }.into())
        })
        .await
    }
}
