//! Catalog browsing.

use anyhow::{bail, Result};
use shopfront_commerce::catalog::{ProductCatalog, ProductQuery, StockStatus};
use shopfront_commerce::Money;

use super::ProductsArgs;
use crate::context::Context;
use crate::output::{stock_badge, truncate};

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let query = build_query(&args)?;
    let catalog = ctx.catalog()?;
    let shop = ctx.open_shop()?;

    let page = catalog.list_products(&query).await?;

    if ctx.output.is_json() {
        ctx.output.json(&page);
        return Ok(());
    }

    ctx.output.header("Products");
    if page.products.is_empty() {
        ctx.output.info("No products match.");
        return Ok(());
    }

    let widths = [18, 30, 16, 10, 2];
    ctx.output.table_header(&["ID", "NAME", "PRICE", "STOCK", ""], &widths);
    for record in &page.products {
        let price = shop
            .currency
            .format_price(&Money::new(record.price, shop.base));
        let marks = format!(
            "{}{}",
            if shop.cart.contains(&record.id) { "🛒" } else { "" },
            if shop.wishlist.contains(&record.id) { "♥" } else { "" },
        );
        let name = truncate(&record.name, 30);
        let stock = stock_badge(record.stock_status);
        ctx.output.table_row(
            &[
                record.id.as_str(),
                name.as_str(),
                price.as_str(),
                stock.as_str(),
                marks.as_str(),
            ],
            &widths,
        );
    }

    if let Some(ref cursor) = page.next_cursor {
        ctx.output.info(&format!("More products: --cursor {}", cursor));
    }

    Ok(())
}

fn build_query(args: &ProductsArgs) -> Result<ProductQuery> {
    let mut query = ProductQuery::new();

    if let Some(ref category) = args.category {
        query = query.with_category(category.trim());
    }
    if let Some(ref stock) = args.stock {
        let Some(status) = StockStatus::from_str(stock) else {
            bail!("Unknown stock status '{}', expected in-stock or pre-order", stock);
        };
        query = query.with_stock_status(status);
    }
    if let Some(ref search) = args.search {
        query = query.with_search(search.as_str());
    }
    if let Some(ref cursor) = args.cursor {
        query = query.with_cursor(cursor.as_str());
    }
    if let Some(limit) = args.limit {
        query = query.with_limit(limit);
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ProductsArgs {
        ProductsArgs {
            category: None,
            stock: None,
            search: None,
            cursor: None,
            limit: None,
        }
    }

    #[test]
    fn test_build_query() {
        let query = build_query(&ProductsArgs {
            category: Some("kitchen".to_string()),
            stock: Some("pre-order".to_string()),
            limit: Some(5),
            ..args()
        })
        .unwrap();
        assert_eq!(query.category.as_ref().map(|c| c.as_str()), Some("kitchen"));
        assert_eq!(query.stock_status, Some(StockStatus::PreOrder));
        assert_eq!(query.limit, 5);
    }

    #[test]
    fn test_unknown_stock_status() {
        assert!(build_query(&ProductsArgs {
            stock: Some("sold-out".to_string()),
            ..args()
        })
        .is_err());
    }
}
