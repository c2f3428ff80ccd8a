//! Expiration Sweeper
//!
//! Background task that periodically removes entries past their deadline.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{current_timestamp_nanos, CacheStore};

/// Spawns the expiration sweeper on `runtime`.
///
/// The task sleeps for `interval`, then runs one [`sweep_expired`] pass, forever.
/// It only holds a weak reference to the store and exits once the store has
/// been dropped.
///
/// # Returns
/// A JoinHandle for the spawned task, which the owning cache aborts on drop.
pub fn spawn_cleanup_task<K, V>(
    store: Weak<RwLock<CacheStore<K, V>>>,
    interval: Duration,
    runtime: &Handle,
) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    runtime.spawn(async move {
        info!(?interval, "Starting expiration sweeper");

        loop {
            tokio::time::sleep(interval).await;

            let Some(shared) = store.upgrade() else {
                break;
            };
            let removed = sweep_expired(&shared).await;
            drop(shared);

            if removed > 0 {
                info!(removed, "Expiration sweep removed entries");
            } else {
                debug!("Expiration sweep found no expired entries");
            }
        }

        info!("Cache released, expiration sweeper stopped");
    })
}

/// Runs one sweep pass over the store.
///
/// Expired keys are collected under the read lock, then removed under the
/// write lock. Keys removed or re-admitted in between are left alone.
///
/// Returns the number of entries removed.
pub async fn sweep_expired<K, V>(store: &RwLock<CacheStore<K, V>>) -> usize
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    let now = current_timestamp_nanos();

    let keys = store.read().await.expired_keys(now);
    if keys.is_empty() {
        return 0;
    }

    store.write().await.remove_expired(&keys, now)
}
