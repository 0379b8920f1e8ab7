//! Client-local key-value storage for Shopfront.
//!
//! Plays the role a browser's local storage plays for a web storefront:
//! a small, durable, per-client key-value space that the cart and
//! wishlist stores persist into. Values are JSON-serialized.
//!
//! # Example
//!
//! ```rust
//! use shopfront_cache::Cache;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Prefs {
//!     currency: String,
//! }
//!
//! let cache = Cache::in_memory();
//! cache.set("prefs", &Prefs { currency: "USD".into() }).unwrap();
//!
//! let prefs: Option<Prefs> = cache.get("prefs").unwrap();
//! assert_eq!(prefs.unwrap().currency, "USD");
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KvStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore};
}
