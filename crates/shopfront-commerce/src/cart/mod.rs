//! Shopping cart module.
//!
//! Contains the cart store, its line items and immutable snapshots.

mod cart;
mod line_item;

pub use cart::{CartStore, CART_STORAGE_KEY, MAX_QUANTITY_PER_ITEM};
pub use line_item::{CartLineItem, CartSnapshot};
