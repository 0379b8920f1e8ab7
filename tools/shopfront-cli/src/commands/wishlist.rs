//! Wishlist commands.

use anyhow::{bail, Result};
use shopfront_commerce::ProductId;

use super::{WishlistArgs, WishlistCommand};
use crate::context::{Context, Shop};
use crate::output::truncate;

/// Run the wishlist command.
pub async fn run(args: WishlistArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.open_shop()?;

    match args.command.unwrap_or(WishlistCommand::Show) {
        WishlistCommand::Show => {}
        WishlistCommand::Toggle { id } => {
            let catalog = ctx.catalog()?;
            let product = shop.product(&catalog, &id).await?;
            if shop.wishlist.toggle(&product) {
                ctx.output
                    .success(&format!("Saved {} to your wishlist", product.name()));
            } else {
                ctx.output
                    .success(&format!("Removed {} from your wishlist", product.name()));
            }
        }
        WishlistCommand::Remove { id } => {
            let id = ProductId::new(id.trim());
            if !shop.wishlist.remove(&id) {
                bail!("'{}' is not in your wishlist", id);
            }
            ctx.output
                .success(&format!("Removed {} from your wishlist", id));
        }
        WishlistCommand::Clear => {
            shop.wishlist.clear();
            ctx.output.success("Wishlist cleared");
        }
    }

    show(&shop, ctx);
    Ok(())
}

fn show(shop: &Shop, ctx: &Context) {
    let items = shop.wishlist.items();

    if ctx.output.is_json() {
        ctx.output.json(&items);
        return;
    }

    ctx.output.header("Wishlist");
    if items.is_empty() {
        ctx.output.info("Nothing saved yet");
        return;
    }

    let widths = [18, 30, 16, 6];
    ctx.output
        .table_header(&["ID", "NAME", "PRICE", "RATING"], &widths);
    for item in &items {
        let name = truncate(&item.name, 30);
        let price = shop.currency.format_price(&item.price);
        let rating = item
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_default();
        ctx.output.table_row(
            &[item.id.as_str(), name.as_str(), price.as_str(), rating.as_str()],
            &widths,
        );
    }
}
