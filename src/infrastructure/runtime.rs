//! Long-running process lifecycle.

use tokio::sync::watch;
use tracing::info;

use super::bootstrap;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Run the reconciler until `shutdown` flips to true.
///
/// Migrations run first, so a freshly deployed database is usable by the
/// time the first tick lists pending orders. With the reconciler disabled
/// this only keeps the process alive until shutdown.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the accrual client
/// cannot be built.
pub async fn run_with_shutdown(config: Config, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    info!(database = %config.database, "Starting pointkeeper");
    let pool = bootstrap::open_store(&config)?;

    if config.reconciler.enabled {
        let reconciler = bootstrap::build_reconciler(&config, &pool)?;
        info!(accrual = %config.accrual.base_url, "Reconciler enabled");
        reconciler.with_shutdown(shutdown).run().await;
    } else {
        info!("Reconciler disabled, idling until shutdown");
        while !*shutdown.borrow_and_update() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }
    }

    info!("pointkeeper stopped");
    Ok(())
}
