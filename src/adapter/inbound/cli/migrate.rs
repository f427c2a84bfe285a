//! Handler for the `migrate` command.

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Open the database, applying pending migrations.
pub fn execute(config: &Config) -> Result<()> {
    config.init_logging();
    bootstrap::open_store(config)?;
    output::success(&format!("Database ready at {}", config.database));
    Ok(())
}
