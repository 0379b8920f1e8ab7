//! Storefront core for Shopfront.
//!
//! This crate holds the state and rules behind a small online shop:
//!
//! - **Catalog**: product records, validated product references, listing
//! - **Money**: integer minor-unit amounts, currencies, exchange rates
//! - **Cart**: persisted, observable cart with quantity rules and totals
//! - **Wishlist**: persisted set of saved products
//! - **Checkout**: delivery form validation, order submission, order API
//!
//! Prices are stored and summed in the base currency. Conversion to the
//! shopper's display currency happens once, on the final amount.
//!
//! # Example
//!
//! ```rust
//! use shopfront_commerce::prelude::*;
//!
//! let cart = CartStore::in_memory(Currency::VND);
//! let shirt = ProductRef::new("shirt", "Linen shirt", Money::new(100_000, Currency::VND)).unwrap();
//!
//! cart.add_item(&shirt).unwrap();
//! cart.add_item(&shirt).unwrap();
//! assert_eq!(cart.get_total_items(), 2);
//!
//! let currency = CurrencyService::default();
//! currency.set_currency("USD");
//! println!("Total: {}", currency.format_price(&cart.get_total_price()));
//! ```

pub mod auth;
pub mod error;
pub mod exchange;
pub mod ids;
pub mod money;
pub mod store;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod wishlist;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::auth::AuthState;
    pub use crate::error::CommerceError;
    pub use crate::exchange::{CurrencyService, ExchangeRates};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::store::{ObservableStore, SubscriptionId};

    // Catalog
    pub use crate::catalog::{
        ProductCatalog, ProductPage, ProductQuery, ProductRecord, ProductRef, StaticCatalog,
        StockStatus,
    };

    // Cart and wishlist
    pub use crate::cart::{CartLineItem, CartSnapshot, CartStore};
    pub use crate::wishlist::{WishlistItem, WishlistStore};

    // Checkout
    pub use crate::checkout::{
        CheckoutConfig, CheckoutError, CheckoutFlow, CheckoutState, DeliveryInfo, GatewayError,
        LocalOrderGateway, Order, OrderConfirmation, OrderForm, OrderGateway, OrderRequest,
        OrderStatus, OrderUpdate, ValidationError, ValidationRules,
    };
}
