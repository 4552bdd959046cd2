//! Cart commands, driving the cart state machine one operation per run.

use kirana_core::{CartItemId, Price, ProductId};
use kirana_client::cart::CartState;

use super::{CommandError, Context};

/// Show the cart with line totals.
pub async fn show() -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    let cart = hydrated_cart(&ctx).await;

    if cart.is_empty() {
        println!("Cart is empty");
        return Ok(());
    }

    for line in cart.lines() {
        println!(
            "[{}] {:<40} {} x {} = {}",
            line.cart_item_id,
            line.name,
            line.quantity,
            Price::new(line.price),
            Price::new(line.price * rust_decimal::Decimal::from(line.quantity)),
        );
    }
    println!("Total: {} ({} items)", cart.total_price(), cart.count());
    Ok(())
}

/// Add units of a product.
pub async fn add(product_id: i64, quantity: u32) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    let product = ctx.client.get_product(ProductId::new(product_id)).await?;
    let cart = hydrated_cart(&ctx).await;

    let ok = cart.add_item(&product, quantity).await;
    ctx.flush_toast();
    if !ok {
        return Err(CommandError::Cart);
    }
    println!("Total: {} ({} items)", cart.total_price(), cart.count());
    Ok(())
}

/// Remove a cart line.
pub async fn remove(item: i64) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    let cart = hydrated_cart(&ctx).await;

    let ok = cart.remove_item(CartItemId::new(item)).await;
    ctx.flush_toast();
    if !ok {
        return Err(CommandError::Cart);
    }
    Ok(())
}

/// Set a line's quantity.
pub async fn set_quantity(item: i64, quantity: u32) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    let cart = hydrated_cart(&ctx).await;

    cart.update_quantity(CartItemId::new(item), quantity).await;
    ctx.flush_toast();
    println!("Total: {} ({} items)", cart.total_price(), cart.count());
    Ok(())
}

async fn hydrated_cart(ctx: &Context) -> CartState<kirana_client::api::ApiClient> {
    let cart = CartState::new(ctx.client.clone(), ctx.notifier.clone());
    cart.refresh().await;
    cart
}
