//! Handler for the `run` command.

use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use crate::adapter::inbound::cli::output;
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::runtime;

/// Run the reconciler in the foreground until Ctrl+C.
pub async fn execute(config: Config) -> Result<()> {
    config.init_logging();
    output::field("Database", &config.database);
    output::field("Accrual", &config.accrual.base_url);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut app = tokio::spawn(runtime::run_with_shutdown(config, shutdown_rx));

    tokio::select! {
        result = &mut app => return flatten(result),
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received (Ctrl+C)");
            let _ = shutdown_tx.send(true);
        }
    }

    flatten(app.await)
}

fn flatten(result: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    result.map_err(|e| Error::Connection(format!("runtime task failed: {e}")))?
}
