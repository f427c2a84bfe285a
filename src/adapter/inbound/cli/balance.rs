//! Handlers for `balance` subcommands.

use tabled::Tabled;

use crate::adapter::inbound::cli::command::{UserArg, WithdrawArgs};
use crate::adapter::inbound::cli::output;
use crate::domain::Withdrawal;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct WithdrawalLine {
    #[tabled(rename = "Order")]
    order: String,
    #[tabled(rename = "Sum")]
    sum: String,
    #[tabled(rename = "Processed")]
    processed: String,
}

impl From<&Withdrawal> for WithdrawalLine {
    fn from(withdrawal: &Withdrawal) -> Self {
        Self {
            order: withdrawal.order.to_string(),
            sum: withdrawal.sum.to_string(),
            processed: withdrawal.processed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Show a user's balance.
pub async fn show(config: &Config, args: &UserArg) -> Result<()> {
    let pool = bootstrap::open_store(config)?;
    let service = bootstrap::build_loyalty_service(&pool);
    let balance = service.balance(&args.user).await?;

    output::record("balance", &balance, |balance| {
        output::field("Current", output::points(balance.current));
        output::field("Withdrawn", balance.withdrawn);
    });
    Ok(())
}

/// Spend points against a new order.
pub async fn withdraw(config: &Config, args: &WithdrawArgs) -> Result<()> {
    let pool = bootstrap::open_store(config)?;
    let service = bootstrap::build_loyalty_service(&pool);
    service.withdraw(&args.user, &args.order, args.sum).await?;

    output::success(&format!(
        "Withdrew {} points against order {}",
        args.sum,
        args.order.trim()
    ));
    Ok(())
}

/// List a user's withdrawals.
pub async fn withdrawals(config: &Config, args: &UserArg) -> Result<()> {
    let pool = bootstrap::open_store(config)?;
    let service = bootstrap::build_loyalty_service(&pool);
    let withdrawals = service.withdrawals(&args.user).await?;

    output::table(
        "withdrawals",
        &withdrawals,
        |w| WithdrawalLine::from(w),
        "No withdrawals yet",
    );
    Ok(())
}
