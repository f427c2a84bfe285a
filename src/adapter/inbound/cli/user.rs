//! Handler for `user` subcommands.

use serde_json::json;

use crate::adapter::inbound::cli::command::UserAddArgs;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Register a login.
pub async fn add(config: &Config, args: &UserAddArgs) -> Result<()> {
    let pool = bootstrap::open_store(config)?;
    let service = bootstrap::build_loyalty_service(&pool);
    let user = service.register_user(&args.login).await?;

    output::record(
        "user",
        &json!({ "login": args.login.trim(), "id": user.value() }),
        |_| output::success(&format!("Created user {}", args.login.trim())),
    );
    Ok(())
}
