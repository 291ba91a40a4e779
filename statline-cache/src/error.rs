//! Cache layer errors

use thiserror::Error;

/// Errors that can occur in the cache layer
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend (connection or command) failure
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// A stored value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}
