//! Statline Cache Layer
//!
//! Low-latency key-value projection of season aggregates, keyed by
//! `{subject}:{name}:{season}`. The cache is written only by the
//! synchronization sweep and read only by the statistics query surface;
//! every entry is a replaceable snapshot with no independent identity.
//!
//! # Architecture
//!
//! - **`StatCache` trait**: the cache interface (port)
//! - **In-memory cache**: for tests and development
//! - **Redis cache**: production implementation

#![warn(clippy::all)]

// Modules
mod error;
mod key;
mod memory;
mod redis;

// Re-exports
pub use self::redis::RedisCache;
pub use error::CacheError;
pub use key::CacheKey;
pub use memory::MemoryCache;

use async_trait::async_trait;
use statline_domain::StatLine;

/// Key-value cache of serialized season statistics
#[async_trait]
pub trait StatCache: Send + Sync {
    /// Overwrite the snapshot stored under `key`
    async fn set(&self, key: &CacheKey, stats: &StatLine) -> Result<(), CacheError>;

    /// Load the snapshot stored under `key`, if any
    async fn get(&self, key: &CacheKey) -> Result<Option<StatLine>, CacheError>;
}
