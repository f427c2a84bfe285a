//! Handlers for `order` subcommands.

use serde_json::json;
use tabled::Tabled;

use crate::adapter::inbound::cli::command::{OrderUploadArgs, UserArg};
use crate::adapter::inbound::cli::output;
use crate::domain::{Order, OrderNumber, Registration};
use crate::error::{LedgerError, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct OrderLine {
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Accrual")]
    accrual: String,
    #[tabled(rename = "Uploaded")]
    uploaded: String,
}

impl From<&Order> for OrderLine {
    fn from(order: &Order) -> Self {
        Self {
            number: order.number.to_string(),
            status: order.status.to_string(),
            accrual: order.accrual.map(|a| a.to_string()).unwrap_or_default(),
            uploaded: order.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Upload an order. A number owned by someone else is a conflict.
pub async fn upload(config: &Config, args: &OrderUploadArgs) -> Result<()> {
    let pool = bootstrap::open_store(config)?;
    let service = bootstrap::build_loyalty_service(&pool);
    let number = args.number.trim();

    match service.upload_order(&args.user, number).await? {
        Registration::OwnedByOtherUser => {
            Err(LedgerError::OrderOwnedByOtherUser {
                order: OrderNumber::parse(number)?,
            }
            .into())
        }
        registration => {
            let message = if registration == Registration::Registered {
                format!("Order {number} accepted for processing")
            } else {
                format!("Order {number} was already uploaded")
            };
            let accepted = registration == Registration::Registered;
            output::record(
                "order_upload",
                &json!({ "order": number, "accepted": accepted }),
                |_| output::success(&message),
            );
            Ok(())
        }
    }
}

/// List orders of a user.
pub async fn list(config: &Config, args: &UserArg) -> Result<()> {
    let pool = bootstrap::open_store(config)?;
    let service = bootstrap::build_loyalty_service(&pool);
    let orders = service.orders(&args.user).await?;

    output::table("orders", &orders, |o| OrderLine::from(o), "No orders uploaded");
    Ok(())
}
