//! Operator command line.

pub mod balance;
pub mod command;
pub mod migrate;
pub mod order;
pub mod output;
pub mod run;
pub mod user;

use std::path::Path;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use command::{BalanceCommand, Cli, Commands, OrderCommand, UserCommand};

/// Dispatch a parsed command line.
///
/// # Errors
///
/// Returns the handler's error; the binary maps it to an exit code.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet));
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => run::execute(config).await,
        Commands::Migrate => migrate::execute(&config),
        Commands::User(UserCommand::Add(args)) => user::add(&config, &args).await,
        Commands::Order(OrderCommand::Upload(args)) => order::upload(&config, &args).await,
        Commands::Order(OrderCommand::List(args)) => order::list(&config, &args).await,
        Commands::Balance(BalanceCommand::Show(args)) => balance::show(&config, &args).await,
        Commands::Balance(BalanceCommand::Withdraw(args)) => {
            balance::withdraw(&config, &args).await
        }
        Commands::Balance(BalanceCommand::Withdrawals(args)) => {
            balance::withdrawals(&config, &args).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load_or_default(path)
}
