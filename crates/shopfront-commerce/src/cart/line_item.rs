//! Cart line items and snapshots.

use crate::catalog::{ProductRef, StockStatus};
use crate::ids::{CategoryId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// One product in the cart and how many of it.
///
/// Name and price are captured when the product is added and are not
/// re-fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the base currency.
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Always at least 1.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<StockStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl CartLineItem {
    /// A new line for `product` with quantity 1.
    pub fn from_product(product: &ProductRef) -> Self {
        Self {
            id: product.id().clone(),
            name: product.name().to_string(),
            price: product.price(),
            image: product.image().map(str::to_string),
            quantity: 1,
            stock_status: product.stock_status(),
            category: product.category().cloned(),
            rating: product.rating(),
        }
    }

    /// `price * quantity`, saturating at the largest representable amount.
    pub fn line_total(&self) -> Money {
        self.price
            .try_multiply(i64::from(self.quantity))
            .unwrap_or_else(|| {
                tracing::warn!(id = %self.id, "line total overflow, saturating");
                Money::new(i64::MAX, self.price.currency)
            })
    }
}

/// Immutable copy of the cart at one point in time.
///
/// Taken before any asynchronous work (checkout submission) so that work
/// never sees later mutations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSnapshot {
    items: Vec<CartLineItem>,
    currency: Currency,
}

impl CartSnapshot {
    pub fn new(items: Vec<CartLineItem>, currency: Currency) -> Self {
        Self { items, currency }
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// The base currency totals are expressed in.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    pub fn total_items(&self) -> u64 {
        total_items(&self.items)
    }

    /// Sum of `price * quantity` in the base currency.
    pub fn total_price(&self) -> Money {
        total_price(&self.items, self.currency)
    }
}

pub(crate) fn total_items(items: &[CartLineItem]) -> u64 {
    items.iter().map(|i| u64::from(i.quantity)).sum()
}

pub(crate) fn total_price(items: &[CartLineItem], currency: Currency) -> Money {
    let amount = items
        .iter()
        .map(|i| i.line_total().amount_minor)
        .fold(0_i64, i64::saturating_add);
    Money::new(amount, currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, price: i64, quantity: u32) -> CartLineItem {
        let product = ProductRef::new(id, id, Money::new(price, Currency::VND)).unwrap();
        CartLineItem {
            quantity,
            ..CartLineItem::from_product(&product)
        }
    }

    #[test]
    fn test_snapshot_totals() {
        let snapshot = CartSnapshot::new(
            vec![line("a", 100_000, 2), line("b", 50_000, 1)],
            Currency::VND,
        );
        assert_eq!(snapshot.total_items(), 3);
        assert_eq!(snapshot.total_price(), Money::new(250_000, Currency::VND));
        assert_eq!(snapshot.line_count(), 2);
    }

    #[test]
    fn test_empty_snapshot_totals_are_zero() {
        let snapshot = CartSnapshot::new(Vec::new(), Currency::VND);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_items(), 0);
        assert!(snapshot.total_price().is_zero());
    }

    #[test]
    fn test_line_total_saturates() {
        let big = line("a", i64::MAX / 2, 3);
        assert_eq!(big.line_total().amount_minor, i64::MAX);
    }

    #[test]
    fn test_line_item_wire_shape() {
        let json = serde_json::to_value(line("a", 10, 1)).unwrap();
        assert_eq!(json["quantity"], 1);
        assert!(json.get("stockStatus").is_none());
    }
}
