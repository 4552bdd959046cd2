//! Catalog browsing commands.

use kirana_core::{Price, ProductId};
use kirana_client::api::types::Product;

use super::{CommandError, Context};

/// List a page of products.
pub async fn list(page: u32, page_size: u32) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    let products = ctx.client.list_products(page, page_size).await?;

    if let Some(count) = products.count {
        println!("{count} products (page {page})");
    }
    for product in &products.results {
        print_line(product);
    }
    Ok(())
}

/// Search products by text.
pub async fn search(query: &str, limit: u32) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    let products = ctx.client.search_products(query, limit).await?;

    if products.results.is_empty() {
        println!("No products match \"{query}\"");
        return Ok(());
    }
    for product in &products.results {
        print_line(product);
    }
    Ok(())
}

/// Show one product in full.
pub async fn show(id: i64) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;
    let product = ctx.client.get_product(ProductId::new(id)).await?;

    println!("#{}  {}", product.id, product.name);
    if !product.brand.is_empty() {
        println!("Brand: {}", product.brand);
    }
    println!("Price: {}", Price::new(product.price));
    println!("Stock: {}", product.stock);
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
    Ok(())
}

fn print_line(product: &Product) {
    println!(
        "#{:<6} {:<40} {:>12}  stock {}",
        product.id,
        product.name,
        Price::new(product.price).to_string(),
        product.stock
    );
}
