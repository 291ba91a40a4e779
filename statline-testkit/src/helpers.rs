//! Test helper functions for building events and wiring pipelines.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use statline_cache::MemoryCache;
use statline_domain::{EventType, GameEvent};
use statline_pipeline::EventProcessor;
use statline_store::MemoryStore;

/// Parse an RFC 3339 timestamp, panicking on malformed input.
///
/// Test-only convenience: `ts("2025-05-23T15:00:00Z")`.
pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap_or_else(|e| panic!("invalid test timestamp {rfc3339:?}: {e}"))
        .with_timezone(&Utc)
}

/// Build a shot event worth `points`.
pub fn shot(player: &str, team: &str, points: i32, timestamp: &str) -> GameEvent {
    GameEvent {
        player: player.to_string(),
        team: team.to_string(),
        timestamp: ts(timestamp),
        event: EventType::Shot,
        points,
    }
}

/// Build a counting event (rebound, assist, steal, block, foul, turnover).
pub fn counting_event(player: &str, team: &str, kind: EventType, timestamp: &str) -> GameEvent {
    GameEvent {
        player: player.to_string(),
        team: team.to_string(),
        timestamp: ts(timestamp),
        event: kind,
        points: 0,
    }
}

/// Build a substitution event (enter or exit).
pub fn substitution(player: &str, team: &str, kind: EventType, timestamp: &str) -> GameEvent {
    counting_event(player, team, kind, timestamp)
}

/// Wire an event processor over fresh in-memory backends.
///
/// Returns the store and cache alongside the processor so tests can inspect
/// both sides of the pipeline.
pub fn memory_pipeline() -> (
    Arc<MemoryStore>,
    Arc<MemoryCache>,
    EventProcessor<MemoryStore, MemoryCache>,
) {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let processor = EventProcessor::new(store.clone(), cache.clone());
    (store, cache, processor)
}
