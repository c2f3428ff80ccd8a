//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Expiration sweeper: Removes entries past their deadline at a fixed period

mod cleanup;

pub use cleanup::{spawn_cleanup_task, sweep_expired};
