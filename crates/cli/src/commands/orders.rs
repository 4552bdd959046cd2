//! Order history commands.

use kirana_core::{OrderId, Price};
use kirana_client::api::types::OrderSummary;

use super::{CommandError, Context};

/// List past orders, newest first as the server returns them.
pub async fn list() -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    let orders = ctx.client.list_orders().await?;

    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }
    for order in &orders {
        print_line(order);
    }
    Ok(())
}

/// Show one order.
pub async fn show(id: &str) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    let order = ctx.client.get_order(&OrderId::new(id)).await?;

    println!("Order {}", order.id);
    if !order.status.is_empty() {
        println!("Status: {}", order.status);
    }
    if !order.payment_method.is_empty() {
        println!("Payment: {}", order.payment_method);
    }
    if let Some(total) = order.total_amount {
        println!("Total: {}", Price::new(total));
    }
    if let Some(created) = order.created_at {
        println!("Placed: {created}");
    }
    Ok(())
}

fn print_line(order: &OrderSummary) {
    let total = order
        .total_amount
        .map_or_else(|| "-".to_owned(), |t| Price::new(t).to_string());
    println!(
        "{:<14} {:<12} {:<8} {}",
        order.id.as_str(),
        order.status,
        order.payment_method,
        total
    );
}
