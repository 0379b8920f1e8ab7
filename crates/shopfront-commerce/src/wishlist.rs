//! Wishlist store: membership-only sibling of the cart.
//!
//! Shares the [`ObservableStore`] plumbing with the cart but has no
//! quantities or totals. The two stores are independent; removing a
//! product from one never touches the other.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopfront_cache::Cache;

use crate::catalog::ProductRef;
use crate::ids::ProductId;
use crate::money::Money;
use crate::store::{ObservableStore, SubscriptionId};

/// Key the wishlist is persisted under in the local cache.
pub const WISHLIST_STORAGE_KEY: &str = "wishlist";

/// A saved product reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItem {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl From<&ProductRef> for WishlistItem {
    fn from(product: &ProductRef) -> Self {
        Self {
            id: product.id().clone(),
            name: product.name().to_string(),
            price: product.price(),
            image: product.image().map(str::to_string),
            rating: product.rating(),
        }
    }
}

/// Set of saved products, in the order they were saved.
#[derive(Debug, Clone)]
pub struct WishlistStore {
    store: Arc<ObservableStore<Vec<WishlistItem>>>,
}

impl WishlistStore {
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(ObservableStore::in_memory("wishlist")),
        }
    }

    pub fn open(cache: Cache) -> Self {
        Self {
            store: Arc::new(ObservableStore::open("wishlist", cache, WISHLIST_STORAGE_KEY)),
        }
    }

    /// Save a product. Returns `false` if it was already saved.
    pub fn add(&self, product: &ProductRef) -> bool {
        self.store.update(|items| {
            if items.iter().any(|i| &i.id == product.id()) {
                return false;
            }
            items.push(WishlistItem::from(product));
            true
        })
    }

    /// Unsave a product. Returns `false` if it was not saved.
    pub fn remove(&self, id: &ProductId) -> bool {
        self.store.update(|items| {
            let before = items.len();
            items.retain(|i| &i.id != id);
            items.len() < before
        })
    }

    /// Flip membership. Returns whether the product is now saved.
    pub fn toggle(&self, product: &ProductRef) -> bool {
        if self.remove(product.id()) {
            false
        } else {
            self.add(product);
            true
        }
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.store.read(|items| items.iter().any(|i| &i.id == id))
    }

    pub fn items(&self) -> Vec<WishlistItem> {
        self.store.get()
    }

    pub fn len(&self) -> usize {
        self.store.read(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.store.read(Vec::is_empty)
    }

    pub fn clear(&self) {
        self.store.update(|items| {
            let changed = !items.is_empty();
            items.clear();
            changed
        });
    }

    pub fn subscribe(
        &self,
        f: impl Fn(&[WishlistItem]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(move |items: &Vec<WishlistItem>| f(items))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }
}
