//! Command-line interface definitions.
//!
//! The loyalty service has no HTTP surface of its own here; operators and
//! scripts drive it through these subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

/// Loyalty points ledger with accrual reconciliation
#[derive(Parser, Debug)]
#[command(name = "pointkeeper")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults plus environment when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the accrual reconciler until Ctrl+C
    Run,

    /// Create or upgrade the database schema
    Migrate,

    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Upload and list orders
    #[command(subcommand)]
    Order(OrderCommand),

    /// Inspect and spend points
    #[command(subcommand)]
    Balance(BalanceCommand),
}

/// Subcommands for `pointkeeper user`.
#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a new login.
    Add(UserAddArgs),
}

/// Subcommands for `pointkeeper order`.
#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Upload an order number for accrual.
    Upload(OrderUploadArgs),
    /// List a user's orders, oldest first.
    List(UserArg),
}

/// Subcommands for `pointkeeper balance`.
#[derive(Subcommand, Debug)]
pub enum BalanceCommand {
    /// Show current and withdrawn points.
    Show(UserArg),
    /// Spend points against a new order.
    Withdraw(WithdrawArgs),
    /// List past withdrawals, newest first.
    Withdrawals(UserArg),
}

/// Arguments for `user add`.
#[derive(Args, Debug)]
pub struct UserAddArgs {
    /// Login to register
    pub login: String,
}

/// Arguments naming the acting user.
#[derive(Args, Debug)]
pub struct UserArg {
    /// Acting user's login
    #[arg(short, long)]
    pub user: String,
}

/// Arguments for `order upload`.
#[derive(Args, Debug)]
pub struct OrderUploadArgs {
    /// Acting user's login
    #[arg(short, long)]
    pub user: String,

    /// Order number (digits, Luhn-valid)
    pub number: String,
}

/// Arguments for `balance withdraw`.
#[derive(Args, Debug)]
pub struct WithdrawArgs {
    /// Acting user's login
    #[arg(short, long)]
    pub user: String,

    /// New order number to pay with points
    pub order: String,

    /// Points to spend
    pub sum: Decimal,
}
