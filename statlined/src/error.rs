//! Daemon error types.

use statline_cache::CacheError;
use statline_store::StoreError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Result type for daemon operations.
pub type ServerResult<T> = Result<T, ServerError>;
