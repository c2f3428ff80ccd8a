//! Configuration Module
//!
//! Construction parameters for a cache, loadable from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache construction parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime applied by `add_with_ttl` when the caller passes a zero TTL
    pub default_expiration: Duration,
    /// Period of the expiration sweeper, zero disables it
    pub cleanup_interval: Duration,
    /// Maximum number of resident entries
    pub capacity: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_EXPIRATION` - Default TTL in seconds (default: 5)
    /// - `CACHE_CLEANUP_INTERVAL` - Sweeper period in seconds (default: 10)
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 3)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_expiration: env_secs("CACHE_DEFAULT_EXPIRATION")
                .unwrap_or(defaults.default_expiration),
            cleanup_interval: env_secs("CACHE_CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
        }
    }

    /// Rejects configurations the cache cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_expiration: Duration::from_secs(5),
            cleanup_interval: Duration::from_secs(10),
            capacity: 3,
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}
