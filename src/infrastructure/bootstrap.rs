//! Composition root: builds adapters and services from configuration.

use tracing::info;

use crate::adapter::outbound::accrual::AccrualClient;
use crate::adapter::outbound::sqlite::database::connection::{
    create_pool, run_migrations, DbPool,
};
use crate::adapter::outbound::sqlite::{
    SqliteBalanceLedger, SqliteOrderRegistry, SqliteUserDirectory,
};
use crate::application::{AccrualReconciler, LoyaltyService};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// The loyalty service wired to SQLite.
pub type SqliteLoyaltyService =
    LoyaltyService<SqliteOrderRegistry, SqliteBalanceLedger, SqliteUserDirectory>;

/// The reconciler wired to SQLite and the HTTP accrual client.
pub type HttpReconciler = AccrualReconciler<SqliteOrderRegistry, AccrualClient>;

/// Open the configured database and bring its schema up to date.
///
/// # Errors
///
/// Returns an error if the pool cannot be created or migrations fail.
pub fn open_store(config: &Config) -> Result<DbPool> {
    let pool = create_pool(&config.database_url())?;
    run_migrations(&pool)?;
    info!(database = %config.database, "Database initialized");
    Ok(pool)
}

#[must_use]
pub fn build_loyalty_service(pool: &DbPool) -> SqliteLoyaltyService {
    LoyaltyService::new(
        SqliteOrderRegistry::new(pool.clone()),
        SqliteBalanceLedger::new(pool.clone()),
        SqliteUserDirectory::new(pool.clone()),
    )
}

/// Build the reconciler against the configured accrual service.
///
/// # Errors
///
/// Returns an error if the accrual URL is missing or malformed.
pub fn build_reconciler(config: &Config, pool: &DbPool) -> Result<HttpReconciler> {
    config.require_accrual_url()?;
    let client = AccrualClient::from_config(&config.accrual)?;
    Ok(AccrualReconciler::new(
        SqliteOrderRegistry::new(pool.clone()),
        client,
        config.reconciler.clone(),
    ))
}
