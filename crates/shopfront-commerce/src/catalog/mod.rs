//! Catalog module.
//!
//! Contains the product listing contract and the canonical product
//! reference accepted by the cart and wishlist.

mod product;
mod query;

pub use product::{ProductRecord, ProductRef, StockStatus};
pub use query::{ProductCatalog, ProductPage, ProductQuery, StaticCatalog, DEFAULT_PAGE_SIZE};
