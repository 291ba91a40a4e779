//! In-memory cache implementation
//!
//! Used for testing and development without a Redis instance.
//! Values are stored in their serialized form, like the real backend.

use crate::error::CacheError;
use crate::key::CacheKey;
use crate::StatCache;
use async_trait::async_trait;
use statline_domain::StatLine;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory cache for testing
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create a new empty in-memory cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of cached entries
    pub fn entry_count(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Raw serialized value under a key (useful for asserting on the wire
    /// format in tests)
    pub fn raw(&self, key: &CacheKey) -> Option<String> {
        self.entries.read().unwrap().get(&key.to_string()).cloned()
    }

    /// Clear all entries (useful for test setup)
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatCache for MemoryCache {
    async fn set(&self, key: &CacheKey, stats: &StatLine) -> Result<(), CacheError> {
        let value = serde_json::to_string(stats)?;
        self.entries.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<StatLine>, CacheError> {
        let value = self.entries.read().unwrap().get(&key.to_string()).cloned();
        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statline_domain::AggregateKind;

    fn stats() -> StatLine {
        StatLine {
            points: 27.5,
            rebounds: 8.0,
            minutes_played: 36.5,
            ..StatLine::default()
        }
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(AggregateKind::Player, "LeBron James", "2024-25");

        cache.set(&key, &stats()).await.unwrap();

        let loaded = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(loaded, stats());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(AggregateKind::Team, "Nobody", "2024-25");

        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(AggregateKind::Player, "LeBron James", "2024-25");

        cache.set(&key, &stats()).await.unwrap();
        let updated = StatLine {
            points: 30.0,
            ..stats()
        };
        cache.set(&key, &updated).await.unwrap();

        assert_eq!(cache.entry_count(), 1);
        assert_eq!(cache.get(&key).await.unwrap().unwrap().points, 30.0);
    }

    #[tokio::test]
    async fn test_wire_format_is_camel_case_json() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(AggregateKind::Player, "LeBron James", "2024-25");

        cache.set(&key, &stats()).await.unwrap();

        let raw = cache.raw(&key).unwrap();
        assert!(raw.contains("\"minutesPlayed\":36.5"), "raw: {raw}");
    }
}
