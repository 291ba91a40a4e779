//! Cache Synchronizer
//!
//! Republishes stale season aggregates into the cache. A sweep is always
//! table-wide: it picks up every stale row of the requested kind, not just
//! the subject of the triggering event, so a previously failed propagation
//! for an unrelated subject is retried opportunistically on the next event
//! touching that table. There is no background timer; sweeps only run as a
//! side effect of event processing.

use crate::error::SyncError;
use statline_cache::{CacheKey, StatCache};
use statline_domain::AggregateKind;
use statline_store::StatStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Republishes stale aggregate rows from the store into the cache
pub struct CacheSynchronizer<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Rows written to the cache and marked fresh
    pub published: usize,
    /// Rows whose cache write failed; they stay stale and are retried on
    /// the next sweep of the same table
    pub failed: usize,
}

impl<S, C> CacheSynchronizer<S, C>
where
    S: StatStore,
    C: StatCache,
{
    /// Create a synchronizer over a store and a cache.
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self { store, cache }
    }

    /// Sweep one aggregate table: select every stale row, write each to the
    /// cache, and mark a row fresh only after its cache write succeeded.
    ///
    /// A cache failure for one row does not block the remaining rows.
    pub async fn sync(&self, kind: AggregateKind) -> Result<SyncReport, SyncError> {
        let stale = self.store.find_stale(kind).await?;
        let mut report = SyncReport::default();

        for aggregate in stale {
            let key = CacheKey::new(kind, aggregate.name.clone(), aggregate.season.clone());

            match self.cache.set(&key, &aggregate.stats).await {
                Ok(()) => {
                    self.store
                        .mark_fresh(kind, &aggregate.name, &aggregate.season)
                        .await?;
                    report.published += 1;
                },
                Err(error) => {
                    warn!(%key, %error, "cache write failed, row stays stale");
                    report.failed += 1;
                },
            }
        }

        debug!(
            %kind,
            published = report.published,
            failed = report.failed,
            "sweep complete"
        );

        Ok(report)
    }
}
