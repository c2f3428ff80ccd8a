//! Shared Cache Module
//!
//! Thread-safe cache handle: a [`CacheStore`] behind a tokio `RwLock`, plus the
//! expiration sweeper bound to the handle's lifetime.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::cache::{CacheStore, Entry};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_cleanup_task, sweep_expired};

// == Cache ==
/// Bounded LRU cache with background TTL expiration.
///
/// Share it between tasks with `Arc<Cache<K, V>>`. Dropping the last handle
/// stops the sweeper.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use lru_ttl_cache::Cache;
///
/// # async fn demo() -> lru_ttl_cache::error::Result<()> {
/// let cache = Cache::new(Duration::from_secs(5), Duration::from_secs(10), 3)?;
/// cache.add(1, "hello").await;
/// cache.add_with_ttl(2, "world", Duration::ZERO).await;
/// assert_eq!(cache.get(&1).await, Some("hello"));
/// # Ok(())
/// # }
/// ```
pub struct Cache<K, V> {
    store: Arc<RwLock<CacheStore<K, V>>>,
    capacity: usize,
    sweeper: Option<JoinHandle<()>>,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `default_expiration` - Lifetime for `add_with_ttl` calls passing a zero TTL
    /// * `cleanup_interval` - Sweeper period, zero disables expiration entirely
    /// * `capacity` - Maximum number of resident entries, at least 1
    ///
    /// # Errors
    /// - `InvalidCapacity` if `capacity` is zero
    /// - `NoRuntime` if a sweeper is requested outside a tokio runtime
    pub fn new(
        default_expiration: Duration,
        cleanup_interval: Duration,
        capacity: usize,
    ) -> Result<Self> {
        let store = Arc::new(RwLock::new(CacheStore::new(
            capacity,
            default_expiration,
        )?));

        let sweeper = if cleanup_interval.is_zero() {
            None
        } else {
            let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
            Some(spawn_cleanup_task(
                Arc::downgrade(&store),
                cleanup_interval,
                &runtime,
            ))
        };

        Ok(Self {
            store,
            capacity,
            sweeper,
        })
    }

    /// Creates an empty cache from a validated configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.default_expiration,
            config.cleanup_interval,
            config.capacity,
        )
    }

    // == Add ==
    /// Admits `key` with no deadline, evicting the least recently used entry
    /// when full.
    ///
    /// An existing key is left untouched; remove it first to refresh it.
    /// Returns true if the key was admitted.
    pub async fn add(&self, key: K, value: V) -> bool {
        self.store.write().await.add(key, value)
    }

    // == Add With TTL ==
    /// Admits `key` with a deadline `ttl` from now.
    ///
    /// A zero `ttl` uses the default expiration; when that is zero too the
    /// entry never expires.
    pub async fn add_with_ttl(&self, key: K, value: V, ttl: Duration) -> bool {
        self.store.write().await.add_with_ttl(key, value, ttl)
    }

    // == Get ==
    /// Returns a copy of the value and marks the key as most recently used.
    ///
    /// Takes the write lock since the lookup relinks the recency list.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.store.write().await.get(key)
    }

    // == Remove ==
    /// Removes `key`. Returns true if it was resident.
    pub async fn remove(&self, key: &K) -> bool {
        self.store.write().await.remove(key)
    }

    // == Clear ==
    /// Drops every entry. The sweeper keeps running.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Returns the capacity fixed at construction.
    pub fn cap(&self) -> usize {
        self.capacity
    }

    // == Get All ==
    /// Returns a point-in-time copy of every resident entry.
    pub async fn get_all(&self) -> HashMap<K, Entry<K, V>> {
        self.store.read().await.snapshot()
    }

    /// Returns the resident keys, most recently used first.
    pub async fn keys(&self) -> Vec<K> {
        self.store.read().await.keys()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Runs one expiration pass now. Returns the number of entries removed.
    pub async fn sweep_expired(&self) -> usize {
        sweep_expired(&self.store).await
    }

    /// Returns true if a background sweeper was started for this cache.
    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }
}

impl<K, V> Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("capacity", &self.capacity)
            .field("sweeper", &self.sweeper.is_some())
            .finish()
    }
}

impl<K, V> Drop for Cache<K, V> {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
