//! Pipeline errors

use statline_domain::ValidationError;
use statline_store::StoreError;
use thiserror::Error;

/// Errors surfaced by event processing.
///
/// Cache-sweep failures are deliberately absent: once the event's own
/// transaction has committed, the event is processed and sweep problems
/// are only logged and retried on a later sweep.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The event failed validation; nothing was persisted
    #[error("invalid event: {0}")]
    Validation(#[from] ValidationError),

    /// The multi-table write failed and was rolled back in full
    #[error("transaction failed: {0}")]
    Transaction(#[from] StoreError),
}

/// Errors surfaced by a cache-synchronization sweep.
///
/// Only store-side failures end a sweep early; a cache write failing for
/// one row leaves that row stale and the sweep moves on.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The stale-row scan or the freshness flip failed
    #[error("store failure during sweep: {0}")]
    Store(#[from] StoreError),
}
