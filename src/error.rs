//! Error types for the cache
//!
//! Cache operations never fail; these errors only arise while constructing a cache.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors reported when a cache cannot be built from its configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must hold at least one entry
    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// A sweeper was requested but no tokio runtime is running
    #[error("No tokio runtime available to run the expiration sweeper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
