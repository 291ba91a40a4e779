//! Store trait definition (Port)
//!
//! The trait defines the storage interface for the pipeline.
//! Implementations can be PostgreSQL or in-memory for testing.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::NaiveDate;
use statline_domain::{AggregateKind, GameEvent, PlayerGameLine, SeasonAggregate};

/// Relational persistence for events and their derived statistics
#[async_trait]
pub trait StatStore: Send + Sync {
    /// Apply one validated event as a single atomic unit:
    ///
    /// 1. upsert the event row keyed by (player, timestamp), overwriting
    ///    event type and value on conflict (correction semantics)
    /// 2. re-derive the full per-game line for (player, game date) from the
    ///    event history
    /// 3. re-derive the player's season aggregate and mark it stale
    /// 4. re-derive the team's season aggregate and mark it stale
    ///
    /// Either all four rows commit or none do.
    async fn apply_event(&self, event: &GameEvent) -> Result<(), StoreError>;

    /// All season aggregates of the given kind still awaiting cache
    /// propagation, ordered by (name, season)
    async fn find_stale(&self, kind: AggregateKind) -> Result<Vec<SeasonAggregate>, StoreError>;

    /// Mark one aggregate row as propagated to the cache.
    /// A row that no longer exists is not an error.
    async fn mark_fresh(
        &self,
        kind: AggregateKind,
        name: &str,
        season: &str,
    ) -> Result<(), StoreError>;

    /// Load one per-game line
    async fn game_line(
        &self,
        player: &str,
        game_date: NaiveDate,
    ) -> Result<Option<PlayerGameLine>, StoreError>;

    /// Load one season aggregate
    async fn season_aggregate(
        &self,
        kind: AggregateKind,
        name: &str,
        season: &str,
    ) -> Result<Option<SeasonAggregate>, StoreError>;
}
