//! Event Processor
//!
//! The single entry point of the write path: validates an inbound event,
//! hands it to the store as one atomic multi-table write, and then asks the
//! synchronizer to sweep both aggregate tables.

use crate::error::PipelineError;
use crate::synchronizer::CacheSynchronizer;
use statline_cache::StatCache;
use statline_domain::{AggregateKind, GameEvent};
use statline_store::StatStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Validates, persists, and propagates inbound game events
pub struct EventProcessor<S, C> {
    store: Arc<S>,
    synchronizer: CacheSynchronizer<S, C>,
}

impl<S, C> EventProcessor<S, C>
where
    S: StatStore,
    C: StatCache,
{
    /// Create a processor over a store and a cache.
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        let synchronizer = CacheSynchronizer::new(store.clone(), cache);
        Self {
            store,
            synchronizer,
        }
    }

    /// Process one inbound event.
    ///
    /// Validation failures and store failures surface to the caller; the
    /// store write is all-or-nothing. The cache sweeps that follow a
    /// committed write never fail the request; stale rows are retried on
    /// the next event touching the same table.
    pub async fn process(&self, event: &GameEvent) -> Result<(), PipelineError> {
        event.validate()?;

        self.store.apply_event(event).await?;
        info!(
            player = %event.player,
            team = %event.team,
            kind = %event.event,
            "event processed"
        );

        // Table-wide catch-up sweeps; the processor does not pick recipients
        // by identity.
        for kind in AggregateKind::ALL {
            match self.synchronizer.sync(kind).await {
                Ok(report) if report.failed > 0 => {
                    warn!(%kind, failed = report.failed, "sweep left stale rows behind");
                },
                Ok(_) => {},
                Err(error) => {
                    warn!(%kind, %error, "sweep failed, aggregates stay stale");
                },
            }
        }

        Ok(())
    }

    /// The synchronizer used after each processed event (also usable for
    /// manual catch-up).
    pub fn synchronizer(&self) -> &CacheSynchronizer<S, C> {
        &self.synchronizer
    }
}
