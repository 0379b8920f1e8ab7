//! Cart commands.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use serde_json::json;
use shopfront_commerce::cart::MAX_QUANTITY_PER_ITEM;
use shopfront_commerce::catalog::StockStatus;
use shopfront_commerce::ProductId;

use super::{CartArgs, CartCommand};
use crate::context::{Context, Shop};
use crate::output::truncate;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.open_shop()?;

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => {}
        CartCommand::Add { id } => add(&id, &shop, ctx).await?,
        CartCommand::Set { id, quantity } => set(&id, quantity, &shop, ctx)?,
        CartCommand::Inc { id } => {
            let id = existing_line(&id, &shop)?;
            shop.cart.increment(&id);
            report_quantity(&id, &shop, ctx);
        }
        CartCommand::Dec { id } => {
            let id = existing_line(&id, &shop)?;
            shop.cart.decrement(&id);
            report_quantity(&id, &shop, ctx);
        }
        CartCommand::Remove { id } => {
            let id = existing_line(&id, &shop)?;
            shop.cart.remove_item(&id);
            ctx.output.success(&format!("Removed {} from the cart", id));
        }
        CartCommand::Clear { yes } => {
            if shop.cart.is_empty() {
                ctx.output.info("Cart is already empty");
            } else if yes || confirm_clear(ctx)? {
                shop.cart.clear_cart();
                ctx.output.success("Cart cleared");
            } else {
                ctx.output.info("Cart kept");
            }
        }
    }

    show(&shop, ctx);
    if !shop.cart.is_persistent() {
        ctx.output
            .warn("Cart could not be saved and will be lost when this command exits");
    }
    Ok(())
}

async fn add(id: &str, shop: &Shop, ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let product = shop.product(&catalog, id).await?;

    shop.cart.add_item(&product)?;

    let quantity = shop
        .cart
        .get_item(product.id())
        .map(|line| line.quantity)
        .unwrap_or(1);
    ctx.output.success(&format!(
        "Added {} to the cart (quantity {})",
        product.name(),
        quantity
    ));
    if product.stock_status() == Some(StockStatus::PreOrder) {
        ctx.output
            .info("This product is on pre-order and ships when it is back in stock");
    }
    Ok(())
}

fn set(id: &str, quantity: i64, shop: &Shop, ctx: &Context) -> Result<()> {
    let id = existing_line(id, shop)?;
    shop.cart.update_quantity(&id, quantity);

    if quantity < 1 {
        ctx.output
            .warn("Quantity must be at least 1, use `shop cart remove` to drop a line");
    } else if quantity > i64::from(MAX_QUANTITY_PER_ITEM) {
        ctx.output.warn(&format!(
            "Quantity capped at {}",
            MAX_QUANTITY_PER_ITEM
        ));
    }
    report_quantity(&id, shop, ctx);
    Ok(())
}

fn existing_line(id: &str, shop: &Shop) -> Result<ProductId> {
    let id = ProductId::new(id.trim());
    if !shop.cart.contains(&id) {
        bail!("'{}' is not in the cart", id);
    }
    Ok(id)
}

fn report_quantity(id: &ProductId, shop: &Shop, ctx: &Context) {
    if let Some(line) = shop.cart.get_item(id) {
        ctx.output
            .success(&format!("{}: quantity {}", line.name, line.quantity));
    }
}

fn confirm_clear(ctx: &Context) -> Result<bool> {
    if !ctx.output.is_interactive() {
        bail!("Refusing to clear the cart without --yes");
    }
    Ok(Confirm::new()
        .with_prompt("Remove everything from the cart?")
        .default(false)
        .interact()?)
}

/// Print the cart with prices in the display currency.
pub fn show(shop: &Shop, ctx: &Context) {
    let snapshot = shop.cart.snapshot();
    let total = snapshot.total_price();
    let display_total = shop.currency.convert_price(&total);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "items": snapshot.items(),
            "totalItems": snapshot.total_items(),
            "totalPrice": total,
            "displayTotal": display_total,
            "displayCurrency": shop.currency.active_currency().code(),
        }));
        return;
    }

    ctx.output.header("Cart");
    if snapshot.is_empty() {
        ctx.output.info("Your cart is empty");
        return;
    }

    let widths = [18, 28, 5, 16, 16];
    ctx.output
        .table_header(&["ID", "NAME", "QTY", "UNIT", "SUBTOTAL"], &widths);
    for line in snapshot.items() {
        let name = truncate(&line.name, 28);
        let quantity = line.quantity.to_string();
        let unit = shop.currency.format_price(&line.price);
        let subtotal = shop.currency.format_price(&line.line_total());
        ctx.output.table_row(
            &[
                line.id.as_str(),
                name.as_str(),
                quantity.as_str(),
                unit.as_str(),
                subtotal.as_str(),
            ],
            &widths,
        );
    }

    println!();
    ctx.output.kv("Items", &snapshot.total_items().to_string());
    ctx.output
        .kv("Total", &shop.currency.format_money(&display_total));
    if display_total.currency != total.currency {
        ctx.output.kv("Charged in", &total.display());
    }
}
