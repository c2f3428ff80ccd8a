//! Cache Module
//!
//! Provides a bounded in-memory cache with LRU eviction and TTL expiration.

mod concurrent;
mod entry;
mod lru;
mod store;


// Re-export public types
pub use concurrent::Cache;
pub use entry::{current_timestamp_nanos, Entry, NO_EXPIRATION};
pub use lru::{Iter, NodeId, RecencyList};
pub use store::CacheStore;
