//! LRU TTL Cache - A bounded in-memory key/value cache
//!
//! Combines least-recently-used eviction at a fixed capacity with a background
//! sweeper that removes entries past their deadline.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, Entry};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
