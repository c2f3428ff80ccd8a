//! Cache Entry Module
//!
//! Defines the immutable record stored for each resident key.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Deadline value meaning "never expires".
pub const NO_EXPIRATION: i64 = 0;

// == Cache Entry ==
/// A single cache entry with its insertion time and absolute deadline.
///
/// Entries are never mutated once admitted; refreshing a key means removing it
/// and admitting a fresh entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry<K, V> {
    /// The key this entry is indexed under
    pub key: K,
    /// The stored value, opaque to the cache
    pub value: V,
    /// Wall-clock instant of insertion
    pub created: DateTime<Utc>,
    /// Absolute deadline in unix nanoseconds, `NO_EXPIRATION` = never
    pub expiration: i64,
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    ///
    /// # Arguments
    /// * `ttl` - Lifetime from now, `None` or a zero duration for no deadline
    pub fn new(key: K, value: V, ttl: Option<Duration>) -> Self {
        let created = Utc::now();
        let expiration = match ttl {
            Some(ttl) if !ttl.is_zero() => {
                let ttl_nanos = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
                nanos_of(created).saturating_add(ttl_nanos)
            }
            _ => NO_EXPIRATION,
        };

        Self {
            key,
            value,
            created,
            expiration,
        }
    }

    /// Returns true if the entry carries a deadline.
    pub fn has_expiration(&self) -> bool {
        self.expiration > NO_EXPIRATION
    }

    // == Is Expired ==
    /// Checks whether the deadline has strictly passed at `now_nanos`.
    ///
    /// An entry is still live at the exact instant of its deadline.
    pub fn is_expired_at(&self, now_nanos: i64) -> bool {
        self.has_expiration() && self.expiration < now_nanos
    }

    /// Checks whether the deadline has passed as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_nanos())
    }

    /// Returns the deadline as a timestamp, or None if the entry never expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.has_expiration()
            .then(|| DateTime::from_timestamp_nanos(self.expiration))
    }

    // == Time To Live ==
    /// Returns the time left before the deadline.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the deadline has passed
    /// - `Some(remaining)` if the deadline is still ahead
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        if !self.has_expiration() {
            return None;
        }
        let remaining = self.expiration.saturating_sub(current_timestamp_nanos());
        Some(Duration::from_nanos(u64::try_from(remaining).unwrap_or(0)))
    }
}

// == Utility Functions ==
/// Returns the current wall-clock time in unix nanoseconds.
pub fn current_timestamp_nanos() -> i64 {
    nanos_of(Utc::now())
}

fn nanos_of(instant: DateTime<Utc>) -> i64 {
    // Out of range only past the year 2262.
    instant.timestamp_nanos_opt().unwrap_or(i64::MAX)
}
