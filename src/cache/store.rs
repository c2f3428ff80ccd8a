//! Cache Store Module
//!
//! Main cache engine coupling a key index with a recency list. The store is not
//! synchronised itself; [`Cache`](crate::cache::Cache) serialises access to it.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{Entry, NodeId, RecencyList};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded storage with LRU eviction and per-entry deadlines.
///
/// Every key in `index` resolves to exactly one node in `recency` holding an
/// entry with that key, and both always have the same size.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key to recency-list handle
    index: HashMap<K, NodeId>,
    /// Entries ordered most to least recently used
    recency: RecencyList<Entry<K, V>>,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Lifetime used by `add_with_ttl` when given a zero TTL
    default_expiration: Duration,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, at least 1
    /// * `default_expiration` - Lifetime for `add_with_ttl` calls passing a zero TTL
    pub fn new(capacity: usize, default_expiration: Duration) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        Ok(Self {
            index: HashMap::with_capacity(capacity),
            recency: RecencyList::with_capacity(capacity),
            capacity,
            default_expiration,
        })
    }

    // == Add ==
    /// Admits a key that never expires.
    ///
    /// A key that is already resident is left untouched, value and recency alike.
    /// Returns true if the key was admitted.
    pub fn add(&mut self, key: K, value: V) -> bool {
        self.admit(key, value, None)
    }

    // == Add With TTL ==
    /// Admits a key with a deadline of now + `ttl`.
    ///
    /// A zero `ttl` falls back to the default expiration; if that is also zero
    /// the entry never expires. Duplicates are ignored as in [`add`](Self::add).
    pub fn add_with_ttl(&mut self, key: K, value: V, ttl: Duration) -> bool {
        let ttl = if ttl.is_zero() {
            self.default_expiration
        } else {
            ttl
        };
        self.admit(key, value, Some(ttl))
    }

    fn admit(&mut self, key: K, value: V, ttl: Option<Duration>) -> bool {
        if self.index.contains_key(&key) {
            info!(key = ?key, "Key already exists");
            return false;
        }

        if self.recency.len() >= self.capacity {
            self.evict_oldest();
        }

        let entry = Entry::new(key.clone(), value, ttl);
        let expiration = entry.expiration;
        let id = self.recency.push_front(entry);
        self.index.insert(key.clone(), id);

        info!(key = ?key, expiration, "Saved entry");
        true
    }

    fn evict_oldest(&mut self) {
        if let Some(evicted) = self.recency.pop_back() {
            self.index.remove(&evicted.key);
            debug!(key = ?evicted.key, "Evicted least recently used entry");
        }
    }

    // == Get ==
    /// Returns a copy of the value and marks the key as most recently used.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let id = *self.index.get(key)?;
        self.recency.move_to_front(id);
        self.recency.get(id).map(|entry| entry.value.clone())
    }

    // == Remove ==
    /// Removes a key. Returns true if it was resident.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(id) = self.index.remove(key) else {
            info!(key = ?key, "Key not found");
            return false;
        };
        self.recency.remove(id);

        info!(key = ?key, "Removed entry");
        true
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&mut self) {
        self.recency.clear();
        self.index.clear();
        debug!("Cleared all entries");
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the lifetime applied to zero-TTL admissions.
    pub fn default_expiration(&self) -> Duration {
        self.default_expiration
    }

    // == Snapshot ==
    /// Copies every resident entry into a new map independent of the store.
    pub fn snapshot(&self) -> HashMap<K, Entry<K, V>> {
        self.index
            .iter()
            .filter_map(|(key, id)| {
                self.recency
                    .get(*id)
                    .map(|entry| (key.clone(), entry.clone()))
            })
            .collect()
    }

    /// Returns the resident keys, most recently used first.
    pub fn keys(&self) -> Vec<K> {
        self.recency.iter().map(|entry| entry.key.clone()).collect()
    }

    // == Expiration ==
    /// Collects the keys whose deadline passed before `now_nanos`.
    pub fn expired_keys(&self, now_nanos: i64) -> Vec<K> {
        self.recency
            .iter()
            .filter(|entry| entry.is_expired_at(now_nanos))
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Removes the given keys if they are still resident and still expired at
    /// `now_nanos`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self, keys: &[K], now_nanos: i64) -> usize {
        let mut removed = 0;
        for key in keys {
            let Some(&id) = self.index.get(key) else {
                continue;
            };
            let expired = self
                .recency
                .get(id)
                .is_some_and(|entry| entry.is_expired_at(now_nanos));
            if expired {
                self.index.remove(key);
                self.recency.remove(id);
                removed += 1;
            }
        }
        removed
    }

    /// Removes every entry expired at `now_nanos`. Returns the number removed.
    pub fn cleanup_expired(&mut self, now_nanos: i64) -> usize {
        let keys = self.expired_keys(now_nanos);
        if keys.is_empty() {
            return 0;
        }
        self.remove_expired(&keys, now_nanos)
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the most recently used key.
    #[cfg(test)]
    pub(crate) fn front_key(&self) -> Option<&K> {
        self.recency.front().map(|entry| &entry.key)
    }

    /// Verifies that the index and the recency list agree.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.index.len() != self.recency.len() {
            return Err(format!(
                "index has {} keys but recency list has {} nodes",
                self.index.len(),
                self.recency.len()
            ));
        }
        if self.recency.len() > self.capacity {
            return Err(format!(
                "{} entries exceed capacity {}",
                self.recency.len(),
                self.capacity
            ));
        }
        for (key, id) in &self.index {
            match self.recency.get(*id) {
                Some(entry) if entry.key == *key => {}
                Some(entry) => {
                    return Err(format!("{key:?} resolves to entry for {:?}", entry.key))
                }
                None => return Err(format!("{key:?} holds a dangling handle")),
            }
        }
        let listed = self.recency.iter().count();
        if listed != self.index.len() {
            return Err(format!("iterated {listed} nodes, expected {}", self.index.len()));
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::current_timestamp_nanos;
    use crate::cache::NO_EXPIRATION;

    fn store(capacity: usize) -> CacheStore<i32, &'static str> {
        CacheStore::new(capacity, Duration::ZERO).unwrap()
    }

    #[test]
    fn test_store_new() {
        let store = store(8);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 8);
    }

    #[test]
    fn test_store_rejects_zero_capacity() {
        let result = CacheStore::<i32, i32>::new(0, Duration::ZERO);
        assert_eq!(result.unwrap_err(), CacheError::InvalidCapacity(0));
    }

    #[test]
    fn test_store_add_and_get() {
        let mut store = store(8);

        assert!(store.add(1, "a"));
        assert_eq!(store.get(&1), Some("a"));
        assert_eq!(store.get(&2), None);
        assert_eq!(store.len(), 1);
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_store_duplicate_is_noop() {
        let mut store = store(8);

        assert!(store.add(1, "a"));
        assert!(store.add(2, "b"));
        assert!(!store.add(1, "changed"));
        assert!(!store.add_with_ttl(1, "changed", Duration::from_secs(1)));

        assert_eq!(store.get(&1), Some("a"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_does_not_bump_recency() {
        let mut store = store(2);

        store.add(1, "a");
        store.add(2, "b");
        store.add(1, "again");
        assert_eq!(store.front_key(), Some(&2));

        store.add(3, "c");
        assert_eq!(store.get(&1), None);
        assert_eq!(store.get(&2), Some("b"));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);

        store.add(1, "a");
        store.add(2, "b");
        store.add(3, "c");
        store.add(4, "d");

        assert_eq!(store.len(), 3);
        assert_eq!(store.get(&1), None);
        assert_eq!(store.get(&2), Some("b"));
        assert_eq!(store.get(&3), Some("c"));
        assert_eq!(store.get(&4), Some("d"));
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(3);

        store.add(1, "a");
        store.add(2, "b");
        store.add(3, "c");
        assert_eq!(store.get(&1), Some("a"));
        assert_eq!(store.front_key(), Some(&1));

        store.add(4, "d");

        assert_eq!(store.get(&2), None);
        assert_eq!(store.keys().len(), 3);
        assert!(store.get(&1).is_some());
        assert!(store.get(&3).is_some());
        assert!(store.get(&4).is_some());
    }

    #[test]
    fn test_capacity_one_replaces_sole_entry() {
        let mut store = store(1);

        store.add(1, "a");
        store.add(2, "b");

        assert_eq!(store.keys(), vec![2]);
        assert_eq!(store.get(&1), None);
    }

    #[test]
    fn test_store_remove() {
        let mut store = store(8);

        store.add(1, "a");
        assert!(store.remove(&1));
        assert!(!store.remove(&1));

        assert!(store.is_empty());
        assert_eq!(store.get(&1), None);
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_then_add_refreshes() {
        let mut store = store(8);

        store.add(1, "a");
        store.remove(&1);
        assert!(store.add(1, "b"));
        assert_eq!(store.get(&1), Some("b"));
    }

    #[test]
    fn test_store_clear() {
        let mut store = store(8);

        store.add(1, "a");
        store.add(2, "b");
        store.clear();

        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
        assert_eq!(store.capacity(), 8);

        store.add(3, "c");
        assert_eq!(store.get(&3), Some("c"));
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_keys_in_recency_order() {
        let mut store = store(8);

        store.add(1, "a");
        store.add(2, "b");
        store.add(3, "c");
        store.get(&1);

        assert_eq!(store.keys(), vec![1, 3, 2]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut store = store(8);

        store.add(1, "a");
        store.add(2, "b");
        let snapshot = store.snapshot();

        store.remove(&1);
        store.add(3, "c");

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[&1].value, "a");
        assert_eq!(snapshot[&2].key, 2);
        assert!(!snapshot.contains_key(&3));
    }

    #[test]
    fn test_add_with_ttl_uses_default_expiration() {
        let mut store = CacheStore::new(8, Duration::from_secs(5)).unwrap();
        let before = current_timestamp_nanos();

        store.add_with_ttl(1, "x", Duration::ZERO);
        store.add_with_ttl(2, "y", Duration::from_secs(60));
        store.add(3, "z");

        let snapshot = store.snapshot();
        let default_deadline = snapshot[&1].expiration;
        assert!(default_deadline >= before + 5_000_000_000);
        assert!(default_deadline < before + 60_000_000_000);
        assert!(snapshot[&2].expiration >= before + 60_000_000_000);
        assert_eq!(snapshot[&3].expiration, NO_EXPIRATION);
    }

    #[test]
    fn test_zero_ttl_with_zero_default_never_expires() {
        let mut store = store(8);

        store.add_with_ttl(1, "x", Duration::ZERO);

        assert_eq!(store.snapshot()[&1].expiration, NO_EXPIRATION);
        assert!(store.expired_keys(i64::MAX).is_empty());
    }

    #[test]
    fn test_cleanup_expired() {
        let mut store = store(8);

        store.add_with_ttl(1, "short", Duration::from_secs(1));
        store.add_with_ttl(2, "long", Duration::from_secs(3600));
        store.add(3, "forever");

        let now = current_timestamp_nanos();
        assert_eq!(store.cleanup_expired(now), 0);

        let later = now + 2_000_000_000;
        assert_eq!(store.expired_keys(later), vec![1]);
        assert_eq!(store.cleanup_expired(later), 1);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&1), None);
        assert!(store.get(&2).is_some());
        assert!(store.get(&3).is_some());
        store.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_expired_skips_missing_and_refreshed_keys() {
        let mut store = store(8);

        store.add_with_ttl(1, "a", Duration::from_secs(1));
        store.add_with_ttl(2, "b", Duration::from_secs(1));
        let later = current_timestamp_nanos() + 2_000_000_000;
        let keys = store.expired_keys(later);
        assert_eq!(keys.len(), 2);

        // Between collection and removal: 1 is removed, 2 is re-admitted
        store.remove(&1);
        store.remove(&2);
        store.add_with_ttl(2, "fresh", Duration::from_secs(3600));

        assert_eq!(store.remove_expired(&keys, later), 0);
        assert_eq!(store.get(&2), Some("fresh"));
        store.check_invariants().unwrap();
    }
}
