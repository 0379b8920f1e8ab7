//! Observable, persisted state container shared by the cart and the
//! wishlist.
//!
//! A store owns one value of `S` behind a mutex. Every mutation goes
//! through [`ObservableStore::update`], which applies the change, writes
//! the new value to the local cache and then notifies subscribers with
//! the post-mutation state. Persistence problems never reach the
//! caller: the store logs them and carries on in memory.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{de::DeserializeOwned, Serialize};
use shopfront_cache::Cache;

type Subscriber<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Persistence {
    cache: Cache,
    key: String,
}

struct Inner<S> {
    state: S,
    persistence: Option<Persistence>,
    subscribers: Vec<(SubscriptionId, Subscriber<S>)>,
    next_subscription: u64,
}

/// A mutex-guarded state value with persistence and change
/// notification.
pub struct ObservableStore<S> {
    name: &'static str,
    inner: Mutex<Inner<S>>,
}

impl<S> ObservableStore<S>
where
    S: Clone + Default + Serialize + DeserializeOwned,
{
    /// Create a store that is never persisted.
    pub fn in_memory(name: &'static str) -> Self {
        Self::with_state(name, S::default(), None)
    }

    /// Create a store persisted under `key`, restoring any saved state.
    ///
    /// A missing key starts from the default state. An unreadable value
    /// is logged and also starts from the default state; the next
    /// successful write replaces it.
    pub fn open(name: &'static str, cache: Cache, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match cache.get::<S>(&key) {
            Ok(Some(state)) => {
                tracing::debug!(store = name, key = %key, "restored persisted state");
                state
            }
            Ok(None) => S::default(),
            Err(e) => {
                tracing::warn!(store = name, key = %key, error = %e, "discarding unreadable persisted state");
                S::default()
            }
        };
        Self::with_state(name, state, Some(Persistence { cache, key }))
    }

    fn with_state(name: &'static str, state: S, persistence: Option<Persistence>) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner {
                state,
                persistence,
                subscribers: Vec::new(),
                next_subscription: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the current state.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().state)
    }

    /// A clone of the current state.
    pub fn get(&self) -> S {
        self.lock().state.clone()
    }

    /// Apply a mutation.
    ///
    /// `f` returns whether it changed anything. Unchanged state is
    /// neither persisted nor broadcast. Subscribers run after the lock
    /// is released, so they may read (or even mutate) the store.
    pub fn update(&self, f: impl FnOnce(&mut S) -> bool) -> bool {
        let (snapshot, subscribers) = {
            let mut inner = self.lock();
            if !f(&mut inner.state) {
                return false;
            }
            self.persist(&mut inner);
            let subscribers: Vec<Subscriber<S>> =
                inner.subscribers.iter().map(|(_, s)| Arc::clone(s)).collect();
            (inner.state.clone(), subscribers)
        };

        for subscriber in subscribers {
            subscriber(&snapshot);
        }
        true
    }

    fn persist(&self, inner: &mut Inner<S>) {
        let Some(ref persistence) = inner.persistence else {
            return;
        };
        if let Err(e) = persistence.cache.set(&persistence.key, &inner.state) {
            tracing::warn!(
                store = self.name,
                key = %persistence.key,
                error = %e,
                "persistence failed, continuing in memory only"
            );
            inner.persistence = None;
        }
    }

    /// Register a change callback.
    pub fn subscribe(&self, f: impl Fn(&S) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.subscribers.push((id, Arc::new(f)));
        id
    }

    /// Remove a change callback. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() < before
    }

    /// Whether mutations are still being written to the cache.
    pub fn is_persistent(&self) -> bool {
        self.lock().persistence.is_some()
    }
}

impl<S> fmt::Debug for ObservableStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableStore")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use shopfront_cache::{CacheError, KvStore};

    /// A backend whose writes always fail, like a full browser quota.
    #[derive(Debug, Default)]
    pub struct FullStore;

    impl KvStore for FullStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), CacheError> {
            Err(CacheError::StoreError("quota exceeded".to_string()))
        }

        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Ok(())
        }

        fn keys(&self) -> Result<Vec<String>, CacheError> {
            Ok(Vec::new())
        }
    }
}
