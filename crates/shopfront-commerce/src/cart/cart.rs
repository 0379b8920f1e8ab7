//! The cart store.

use std::sync::Arc;

use shopfront_cache::Cache;

use crate::cart::line_item::{self, CartLineItem, CartSnapshot};
use crate::catalog::ProductRef;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use crate::store::{ObservableStore, SubscriptionId};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: u32 = 9999;

/// Key the cart is persisted under in the local cache.
pub const CART_STORAGE_KEY: &str = "cart";

/// The single source of truth for what is in the cart.
///
/// Cloning gives another handle to the same cart; hand clones to every
/// consumer instead of copying items out. Totals are computed from the
/// items on every call and never cached.
#[derive(Debug, Clone)]
pub struct CartStore {
    store: Arc<ObservableStore<Vec<CartLineItem>>>,
    currency: Currency,
}

impl CartStore {
    /// A cart that lives only as long as the process.
    pub fn in_memory(currency: Currency) -> Self {
        Self {
            store: Arc::new(ObservableStore::in_memory("cart")),
            currency,
        }
    }

    /// A cart persisted in `cache`, restoring any saved contents.
    ///
    /// Saved lines that would not pass [`ProductRef`] validation, are
    /// priced in another currency or have a zero quantity are dropped.
    /// Repeated ids are merged into the first line, capped at
    /// [`MAX_QUANTITY_PER_ITEM`].
    pub fn open(cache: Cache, currency: Currency) -> Self {
        let cart = Self {
            store: Arc::new(ObservableStore::open("cart", cache, CART_STORAGE_KEY)),
            currency,
        };
        cart.store.update(|items| {
            let restored = std::mem::take(items);
            let before = restored.clone();
            *items = normalize_lines(restored, currency);
            if items.len() < before.len() {
                tracing::warn!(
                    dropped = before.len() - items.len(),
                    "dropped or merged invalid persisted cart lines"
                );
            }
            *items != before
        });
        cart
    }

    /// The base currency all cart prices are in.
    pub fn base_currency(&self) -> Currency {
        self.currency
    }

    /// Add one unit of `product`.
    ///
    /// An existing line for the same product id is incremented (up to
    /// [`MAX_QUANTITY_PER_ITEM`]); otherwise a new line with quantity 1
    /// is appended. Fails only if the product is not priced in the
    /// cart's base currency.
    pub fn add_item(&self, product: &ProductRef) -> Result<(), CommerceError> {
        if product.price().currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: product.price().currency.code().to_string(),
            });
        }

        self.store.update(|items| {
            if let Some(existing) = items.iter_mut().find(|i| &i.id == product.id()) {
                if existing.quantity >= MAX_QUANTITY_PER_ITEM {
                    tracing::debug!(id = %product.id(), "quantity already at limit");
                    return false;
                }
                existing.quantity += 1;
                tracing::debug!(id = %product.id(), quantity = existing.quantity, "cart line incremented");
            } else {
                items.push(CartLineItem::from_product(product));
                tracing::debug!(id = %product.id(), "cart line added");
            }
            true
        });
        Ok(())
    }

    /// Set the quantity of an existing line.
    ///
    /// The value is clamped to `1..=MAX_QUANTITY_PER_ITEM`; removing a
    /// line is [`CartStore::remove_item`]'s job. Unknown ids are ignored.
    pub fn update_quantity(&self, id: &ProductId, quantity: i64) {
        let quantity = clamp_quantity(quantity);
        self.store.update(|items| match items.iter_mut().find(|i| &i.id == id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                tracing::debug!(id = %id, quantity, "cart quantity updated");
                true
            }
            _ => false,
        });
    }

    /// Add one to an existing line's quantity.
    pub fn increment(&self, id: &ProductId) {
        if let Some(item) = self.get_item(id) {
            self.update_quantity(id, i64::from(item.quantity) + 1);
        }
    }

    /// Subtract one from an existing line's quantity, never below 1.
    pub fn decrement(&self, id: &ProductId) {
        if let Some(item) = self.get_item(id) {
            self.update_quantity(id, i64::from(item.quantity) - 1);
        }
    }

    /// Remove a line. Removing an absent id is a no-op.
    pub fn remove_item(&self, id: &ProductId) {
        self.store.update(|items| {
            let before = items.len();
            items.retain(|i| &i.id != id);
            let removed = items.len() < before;
            if removed {
                tracing::debug!(id = %id, "cart line removed");
            }
            removed
        });
    }

    /// Empty the cart.
    pub fn clear_cart(&self) {
        self.store.update(|items| {
            if items.is_empty() {
                return false;
            }
            items.clear();
            tracing::debug!("cart cleared");
            true
        });
    }

    /// Take the lines of a placed order out of the cart.
    ///
    /// Each ordered line's quantity is subtracted from the live line with
    /// the same id, and the line is removed when nothing is left. Lines
    /// added after `ordered` was taken are kept.
    pub fn remove_ordered(&self, ordered: &CartSnapshot) {
        self.store.update(|items| {
            let mut changed = false;
            for line in ordered.items() {
                if let Some(item) = items.iter_mut().find(|i| i.id == line.id) {
                    item.quantity = item.quantity.saturating_sub(line.quantity);
                    changed = true;
                }
            }
            items.retain(|i| i.quantity > 0);
            if changed {
                tracing::debug!(lines = ordered.items().len(), "ordered lines removed from cart");
            }
            changed
        });
    }

    /// Sum of all quantities, 0 for an empty cart.
    pub fn get_total_items(&self) -> u64 {
        self.store.read(|items| line_item::total_items(items))
    }

    /// Sum of `price * quantity` in the base currency, 0 for an empty cart.
    pub fn get_total_price(&self) -> Money {
        self.store
            .read(|items| line_item::total_price(items, self.currency))
    }

    /// Line items in insertion order.
    pub fn items(&self) -> Vec<CartLineItem> {
        self.store.get()
    }

    pub fn get_item(&self, id: &ProductId) -> Option<CartLineItem> {
        self.store
            .read(|items| items.iter().find(|i| &i.id == id).cloned())
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.store.read(|items| items.iter().any(|i| &i.id == id))
    }

    pub fn is_empty(&self) -> bool {
        self.store.read(Vec::is_empty)
    }

    /// An immutable copy of the current contents.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::new(self.store.get(), self.currency)
    }

    /// Call `f` with a fresh snapshot after every change.
    pub fn subscribe(&self, f: impl Fn(&CartSnapshot) + Send + Sync + 'static) -> SubscriptionId {
        let currency = self.currency;
        self.store
            .subscribe(move |items| f(&CartSnapshot::new(items.clone(), currency)))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Whether changes are still reaching local storage.
    pub fn is_persistent(&self) -> bool {
        self.store.is_persistent()
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    let clamped = quantity.clamp(1, i64::from(MAX_QUANTITY_PER_ITEM));
    u32::try_from(clamped).unwrap_or(MAX_QUANTITY_PER_ITEM)
}

fn normalize_lines(lines: Vec<CartLineItem>, currency: Currency) -> Vec<CartLineItem> {
    let mut kept: Vec<CartLineItem> = Vec::with_capacity(lines.len());
    for mut line in lines {
        if line.quantity == 0
            || line.price.currency != currency
            || line.price.amount_minor < 0
            || line.id.as_str().trim().is_empty()
            || line.name.trim().is_empty()
        {
            continue;
        }
        match kept.iter_mut().find(|k| k.id == line.id) {
            Some(first) => {
                first.quantity = first
                    .quantity
                    .saturating_add(line.quantity)
                    .min(MAX_QUANTITY_PER_ITEM);
            }
            None => {
                line.quantity = line.quantity.min(MAX_QUANTITY_PER_ITEM);
                kept.push(line);
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::FullStore;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn product(id: &str, price: i64) -> ProductRef {
        ProductRef::new(id, format!("Product {}", id), Money::new(price, Currency::VND)).unwrap()
    }

    fn cart() -> CartStore {
        CartStore::in_memory(Currency::VND)
    }

    #[test]
    fn test_add_distinct_items() {
        let cart = cart();
        for i in 0..5 {
            cart.add_item(&product(&format!("p-{}", i), 1000)).unwrap();
        }

        assert_eq!(cart.get_total_items(), 5);
        let items = cart.items();
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|i| i.quantity == 1));
    }

    #[test]
    fn test_add_same_item_increments_quantity() {
        let cart = cart();
        let a = product("a", 100_000);

        cart.add_item(&a).unwrap();
        cart.add_item(&a).unwrap();

        assert_eq!(cart.get_total_items(), 2);
        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(cart.get_total_price(), Money::new(200_000, Currency::VND));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let cart = cart();
        cart.add_item(&product("b", 1)).unwrap();
        cart.add_item(&product("a", 1)).unwrap();
        cart.add_item(&product("b", 1)).unwrap();

        let ids: Vec<String> = cart.items().into_iter().map(|i| i.id.into_inner()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_add_rejects_foreign_currency() {
        let cart = cart();
        let usd = ProductRef::new("u", "Imported", Money::new(999, Currency::USD)).unwrap();

        let result = cart.add_item(&usd);
        assert!(matches!(result, Err(CommerceError::CurrencyMismatch { .. })));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_price_is_recomputed() {
        let cart = cart();
        cart.add_item(&product("a", 100_000)).unwrap();
        cart.add_item(&product("b", 50_000)).unwrap();
        assert_eq!(cart.get_total_price().amount_minor, 150_000);

        cart.update_quantity(&ProductId::new("a"), 3);
        assert_eq!(cart.get_total_price().amount_minor, 350_000);

        cart.remove_item(&ProductId::new("b"));
        assert_eq!(cart.get_total_price().amount_minor, 300_000);
    }

    #[test]
    fn test_update_quantity_clamps_to_one() {
        let cart = cart();
        cart.add_item(&product("a", 10)).unwrap();
        let id = ProductId::new("a");

        cart.update_quantity(&id, 0);
        assert_eq!(cart.get_item(&id).unwrap().quantity, 1);

        cart.update_quantity(&id, -5);
        assert_eq!(cart.get_item(&id).unwrap().quantity, 1);

        cart.update_quantity(&id, 1_000_000);
        assert_eq!(cart.get_item(&id).unwrap().quantity, MAX_QUANTITY_PER_ITEM);
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let cart = cart();
        cart.add_item(&product("a", 10)).unwrap();
        let before = cart.items();

        cart.update_quantity(&ProductId::new("missing"), 4);
        assert_eq!(cart.items(), before);
    }

    #[test]
    fn test_increment_and_decrement() {
        let cart = cart();
        cart.add_item(&product("a", 10)).unwrap();
        let id = ProductId::new("a");

        cart.increment(&id);
        cart.increment(&id);
        assert_eq!(cart.get_item(&id).unwrap().quantity, 3);

        for _ in 0..5 {
            cart.decrement(&id);
        }
        assert_eq!(cart.get_item(&id).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_saturates_at_limit() {
        let cart = cart();
        let a = product("a", 10);
        cart.add_item(&a).unwrap();
        cart.update_quantity(a.id(), i64::from(MAX_QUANTITY_PER_ITEM));

        cart.add_item(&a).unwrap();
        assert_eq!(cart.get_total_items(), u64::from(MAX_QUANTITY_PER_ITEM));
    }

    #[test]
    fn test_remove_absent_is_idempotent() {
        let cart = cart();
        cart.add_item(&product("a", 10)).unwrap();
        let before = cart.items();

        cart.remove_item(&ProductId::new("missing"));
        assert_eq!(cart.items(), before);

        cart.remove_item(&ProductId::new("a"));
        cart.remove_item(&ProductId::new("a"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_cart() {
        let cart = cart();
        cart.add_item(&product("a", 10)).unwrap();
        cart.add_item(&product("b", 20)).unwrap();

        cart.clear_cart();

        assert_eq!(cart.get_total_items(), 0);
        assert!(cart.get_total_price().is_zero());
        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let drawer = cart();
        let page = drawer.clone();

        drawer.add_item(&product("a", 10)).unwrap();
        assert_eq!(page.get_total_items(), 1);
    }

    #[test]
    fn test_subscribers_see_consistent_totals() {
        let cart = cart();
        let last_total = Arc::new(AtomicU64::new(0));

        let sink = Arc::clone(&last_total);
        let id = cart.subscribe(move |snapshot| {
            sink.store(snapshot.total_items(), Ordering::SeqCst);
        });

        cart.add_item(&product("a", 10)).unwrap();
        cart.add_item(&product("a", 10)).unwrap();
        assert_eq!(last_total.load(Ordering::SeqCst), 2);

        cart.unsubscribe(id);
        cart.clear_cart();
        assert_eq!(last_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_persisted_cart_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cart = CartStore::open(Cache::open_dir(dir.path()).unwrap(), Currency::VND);
            cart.add_item(&product("a", 100_000)).unwrap();
            cart.add_item(&product("a", 100_000)).unwrap();
        }

        let reloaded = CartStore::open(Cache::open_dir(dir.path()).unwrap(), Currency::VND);
        assert_eq!(reloaded.get_total_items(), 2);
        assert_eq!(reloaded.get_total_price().amount_minor, 200_000);
    }

    #[test]
    fn test_reload_drops_foreign_currency_lines() {
        let cache = Cache::in_memory();
        let vnd = CartStore::open(cache.clone(), Currency::VND);
        vnd.add_item(&product("a", 100)).unwrap();

        let usd = CartStore::open(cache, Currency::USD);
        assert!(usd.is_empty());
    }

    #[test]
    fn test_reload_normalizes_saved_lines() {
        let cache = Cache::in_memory();
        let line = |id: &str, price: i64, quantity: u32| CartLineItem {
            quantity,
            ..CartLineItem::from_product(&product(id, price.max(0)))
        };
        let mut negative = line("n", 0, 1);
        negative.price = Money::new(-500, Currency::VND);
        let saved = vec![
            line("a", 100, 1),
            line("b", 40, 20_000),
            line("a", 100, 2),
            negative,
            line("z", 10, 0),
        ];
        cache.set(CART_STORAGE_KEY, &saved).unwrap();

        let cart = CartStore::open(cache.clone(), Currency::VND);
        let ids: Vec<String> = cart.items().into_iter().map(|i| i.id.into_inner()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(cart.get_item(&ProductId::new("a")).unwrap().quantity, 3);
        assert_eq!(
            cart.get_item(&ProductId::new("b")).unwrap().quantity,
            MAX_QUANTITY_PER_ITEM
        );
        assert_eq!(cart.get_total_price().amount_minor, 300 + 40 * 9999);

        let persisted: Vec<CartLineItem> = cache.get(CART_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(persisted, cart.items());
    }

    #[test]
    fn test_remove_ordered_keeps_later_additions() {
        let cart = cart();
        cart.add_item(&product("a", 10)).unwrap();
        cart.add_item(&product("a", 10)).unwrap();
        cart.add_item(&product("b", 20)).unwrap();
        let ordered = cart.snapshot();

        cart.add_item(&product("a", 10)).unwrap();
        cart.add_item(&product("c", 30)).unwrap();
        cart.remove_ordered(&ordered);

        let items = cart.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.as_str(), "a");
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[1].id.as_str(), "c");
    }

    #[test]
    fn test_remove_ordered_empties_unchanged_cart() {
        let cart = cart();
        cart.add_item(&product("a", 10)).unwrap();
        cart.add_item(&product("b", 20)).unwrap();

        cart.remove_ordered(&cart.snapshot());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_storage_failure_keeps_cart_working() {
        let cart = CartStore::open(Cache::with_store(FullStore), Currency::VND);

        cart.add_item(&product("a", 10)).unwrap();
        cart.add_item(&product("a", 10)).unwrap();

        assert_eq!(cart.get_total_items(), 2);
        assert!(!cart.is_persistent());
    }
}
