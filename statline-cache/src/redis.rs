//! Redis cache implementation
//!
//! Production backend. Uses a multiplexed `ConnectionManager`, which
//! reconnects on its own; clones of the manager share one connection.

use crate::error::CacheError;
use crate::key::CacheKey;
use crate::StatCache;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use statline_domain::StatLine;
use tracing::debug;

/// Redis-backed cache
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis and verify the connection with a PING.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Backend(format!("invalid redis url: {e}")))?;
        let mut manager = client.get_connection_manager().await?;

        redis::cmd("PING")
            .query_async::<String>(&mut manager)
            .await?;

        Ok(Self { manager })
    }

    /// Wrap an already-established connection manager.
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl StatCache for RedisCache {
    async fn set(&self, key: &CacheKey, stats: &StatLine) -> Result<(), CacheError> {
        let value = serde_json::to_string(stats)?;
        let mut conn = self.manager.clone();

        redis::cmd("SET")
            .arg(key.to_string())
            .arg(&value)
            .query_async::<()>(&mut conn)
            .await?;

        debug!(%key, "cache entry written");
        Ok(())
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<StatLine>, CacheError> {
        let mut conn = self.manager.clone();

        let value: Option<String> = redis::cmd("GET")
            .arg(key.to_string())
            .query_async(&mut conn)
            .await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
