//! Product records and references.

use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Availability label shown next to a product.
///
/// Informational only: it never blocks a cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    #[default]
    InStock,
    PreOrder,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in-stock",
            StockStatus::PreOrder => "pre-order",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In stock",
            StockStatus::PreOrder => "Pre-order",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "in-stock" | "instock" => Some(StockStatus::InStock),
            "pre-order" | "preorder" => Some(StockStatus::PreOrder),
            _ => None,
        }
    }
}

/// A product as returned by the product listing API.
///
/// `price` is a plain number in the catalog's base currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<StockStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Units on hand, as reported by the API. Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<i64>,
}

/// The one product shape the cart and wishlist accept.
///
/// Constructed through [`ProductRef::new`] or [`ProductRef::from_record`],
/// both of which validate it, so downstream code can trust its fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductRef {
    id: ProductId,
    name: String,
    price: Money,
    image: Option<String>,
    stock_status: Option<StockStatus>,
    category: Option<CategoryId>,
    rating: Option<f32>,
}

impl ProductRef {
    /// Create a validated product reference.
    ///
    /// Fails if the id or name is blank or the price is negative.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
    ) -> Result<Self, CommerceError> {
        let id = id.into();
        let name = name.into().trim().to_string();

        if id.is_blank() {
            return Err(CommerceError::InvalidProduct("missing id".to_string()));
        }
        if name.is_empty() {
            return Err(CommerceError::InvalidProduct(format!("{}: missing name", id)));
        }
        if price.is_negative() {
            return Err(CommerceError::InvalidProduct(format!(
                "{}: negative price {}",
                id, price.amount_minor
            )));
        }

        Ok(Self {
            id,
            name,
            price,
            image: None,
            stock_status: None,
            category: None,
            rating: None,
        })
    }

    /// Build a reference from an API record priced in `base`.
    pub fn from_record(record: &ProductRecord, base: Currency) -> Result<Self, CommerceError> {
        let mut product = Self::new(
            record.id.clone(),
            record.name.clone(),
            Money::new(record.price, base),
        )?;
        product.image = record.image.clone();
        product.stock_status = record.stock_status;
        product.category = record.category.clone();
        product.rating = record.rating;
        Ok(product)
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_stock_status(mut self, status: StockStatus) -> Self {
        self.stock_status = Some(status);
        self
    }

    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price in the base currency.
    pub fn price(&self) -> Money {
        self.price
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn stock_status(&self) -> Option<StockStatus> {
        self.stock_status
    }

    pub fn category(&self) -> Option<&CategoryId> {
        self.category.as_ref()
    }

    pub fn rating(&self) -> Option<f32> {
        self.rating
    }
}
