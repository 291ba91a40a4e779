//! In-memory store implementation
//!
//! Used for testing and development without a database.
//! A single writer lock stands in for the relational transaction: a write
//! either commits every derived row at the end or returns an error before
//! touching any committed state.

use crate::error::StoreError;
use crate::repository::StatStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use statline_domain::{
    AggregateKind, EventType, GameEvent, PlayerGameLine, SeasonAggregate, StatLine,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// In-memory store for testing
pub struct MemoryStore {
    state: RwLock<State>,
    fail_team_aggregates: AtomicBool,
}

#[derive(Default)]
struct State {
    /// Event rows keyed by (player, timestamp)
    events: BTreeMap<(String, DateTime<Utc>), StoredEvent>,
    /// Per-game lines keyed by (player, game date)
    game_lines: HashMap<(String, NaiveDate), PlayerGameLine>,
    /// Player season aggregates keyed by (player, season)
    player_seasons: HashMap<(String, String), SeasonAggregate>,
    /// Team season aggregates keyed by (team, season)
    team_seasons: HashMap<(String, String), SeasonAggregate>,
}

/// The mutable part of an event row. Player and timestamp live in the key;
/// team is immutable after the first insert (corrections only overwrite the
/// event type and points, as the relational upsert does).
struct StoredEvent {
    team: String,
    event: EventType,
    points: i32,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            fail_team_aggregates: AtomicBool::new(false),
        }
    }

    /// Get the number of stored event rows
    pub fn event_count(&self) -> usize {
        self.state.read().unwrap().events.len()
    }

    /// Get the number of per-game lines
    pub fn line_count(&self) -> usize {
        self.state.read().unwrap().game_lines.len()
    }

    /// Clear all data (useful for test setup)
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap();
        state.events.clear();
        state.game_lines.clear();
        state.player_seasons.clear();
        state.team_seasons.clear();
    }

    /// Make the team-aggregate step of [`StatStore::apply_event`] fail.
    ///
    /// Test hook for exercising the all-or-nothing contract: with this set,
    /// `apply_event` errors after the earlier steps have been computed and
    /// leaves no state change behind.
    pub fn fail_team_aggregate_writes(&self, fail: bool) {
        self.fail_team_aggregates.store(fail, Ordering::SeqCst);
    }

    /// Events for one player/team/date, with the incoming upsert already
    /// merged in (replacing any row with the same (player, timestamp) key).
    /// `stored_team` is the immutable team of the upserted row.
    fn scoped_events(
        state: &State,
        event: &GameEvent,
        game_date: NaiveDate,
        stored_team: &str,
    ) -> Vec<GameEvent> {
        let mut scoped: Vec<GameEvent> = state
            .events
            .iter()
            .filter(|((player, timestamp), stored)| {
                *player == event.player
                    && stored.team == event.team
                    && timestamp.date_naive() == game_date
                    && *timestamp != event.timestamp
            })
            .map(|((player, timestamp), stored)| GameEvent {
                player: player.clone(),
                team: stored.team.clone(),
                timestamp: *timestamp,
                event: stored.event,
                points: stored.points,
            })
            .collect();

        // The upserted row participates only if its (immutable) team matches
        // the recompute scope.
        if stored_team == event.team {
            scoped.push(GameEvent {
                player: event.player.clone(),
                team: stored_team.to_string(),
                timestamp: event.timestamp,
                event: event.event,
                points: event.points,
            });
        }

        scoped
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirror of the relational CHECK constraints on per-game lines.
fn check_line_ranges(line: &PlayerGameLine) -> Result<(), StoreError> {
    if !(0..=6).contains(&line.fouls) {
        return Err(StoreError::Constraint(format!(
            "fouls out of range for {} on {}: {}",
            line.player, line.game_date, line.fouls
        )));
    }

    if !(0.0..=48.0).contains(&line.minutes_played) {
        return Err(StoreError::Constraint(format!(
            "minutes_played out of range for {} on {}: {}",
            line.player, line.game_date, line.minutes_played
        )));
    }

    Ok(())
}

// =============================================================================
// StatStore Implementation
// =============================================================================

#[async_trait]
impl StatStore for MemoryStore {
    async fn apply_event(&self, event: &GameEvent) -> Result<(), StoreError> {
        let game_date = event.game_date();
        let season = event.season();
        let line_key = (event.player.clone(), game_date);

        let mut state = self.state.write().unwrap();

        // A correction keeps the stored row's team.
        let stored_team = state
            .events
            .get(&(event.player.clone(), event.timestamp))
            .map(|stored| stored.team.clone())
            .unwrap_or_else(|| event.team.clone());

        // Stage every derived row first; nothing is committed until all of
        // them have been computed and checked.
        let scoped = Self::scoped_events(&state, event, game_date, &stored_team);
        let line =
            PlayerGameLine::from_events(&event.player, &event.team, game_date, &season, &scoped);
        check_line_ranges(&line)?;

        let player_stats = StatLine::average(
            state
                .game_lines
                .iter()
                .filter(|(key, existing)| {
                    **key != line_key
                        && existing.player == event.player
                        && existing.season == season
                })
                .map(|(_, existing)| existing)
                .chain(std::iter::once(&line)),
        );

        if self.fail_team_aggregates.load(Ordering::SeqCst) {
            return Err(StoreError::Database(
                "injected failure before the team aggregate write".to_string(),
            ));
        }

        let team_stats = StatLine::average(
            state
                .game_lines
                .iter()
                .filter(|(key, existing)| {
                    **key != line_key && existing.team == event.team && existing.season == season
                })
                .map(|(_, existing)| existing)
                .chain(std::iter::once(&line)),
        );

        // Commit point: all four rows at once.
        state.events.insert(
            (event.player.clone(), event.timestamp),
            StoredEvent {
                team: stored_team,
                event: event.event,
                points: event.points,
            },
        );
        state.game_lines.insert(line_key, line);
        state.player_seasons.insert(
            (event.player.clone(), season.clone()),
            SeasonAggregate {
                name: event.player.clone(),
                season: season.clone(),
                stats: player_stats,
                fresh: false,
            },
        );
        state.team_seasons.insert(
            (event.team.clone(), season.clone()),
            SeasonAggregate {
                name: event.team.clone(),
                season,
                stats: team_stats,
                fresh: false,
            },
        );

        Ok(())
    }

    async fn find_stale(&self, kind: AggregateKind) -> Result<Vec<SeasonAggregate>, StoreError> {
        let state = self.state.read().unwrap();
        let table = match kind {
            AggregateKind::Player => &state.player_seasons,
            AggregateKind::Team => &state.team_seasons,
        };

        let mut stale: Vec<SeasonAggregate> = table
            .values()
            .filter(|aggregate| !aggregate.fresh)
            .cloned()
            .collect();
        stale.sort_by(|a, b| (&a.name, &a.season).cmp(&(&b.name, &b.season)));

        Ok(stale)
    }

    async fn mark_fresh(
        &self,
        kind: AggregateKind,
        name: &str,
        season: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        let table = match kind {
            AggregateKind::Player => &mut state.player_seasons,
            AggregateKind::Team => &mut state.team_seasons,
        };

        if let Some(aggregate) = table.get_mut(&(name.to_string(), season.to_string())) {
            aggregate.fresh = true;
        }

        Ok(())
    }

    async fn game_line(
        &self,
        player: &str,
        game_date: NaiveDate,
    ) -> Result<Option<PlayerGameLine>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .game_lines
            .get(&(player.to_string(), game_date))
            .cloned())
    }

    async fn season_aggregate(
        &self,
        kind: AggregateKind,
        name: &str,
        season: &str,
    ) -> Result<Option<SeasonAggregate>, StoreError> {
        let state = self.state.read().unwrap();
        let table = match kind {
            AggregateKind::Player => &state.player_seasons,
            AggregateKind::Team => &state.team_seasons,
        };
        Ok(table.get(&(name.to_string(), season.to_string())).cloned())
    }
}

// =============================================================================
// Tests
// =============================================================================
