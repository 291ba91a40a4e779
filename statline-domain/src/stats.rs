//! Derived Statistics
//!
//! Per-game lines and per-season aggregates. Both are always re-derived in
//! full from their source rows (never incremented), which makes the write
//! path idempotent under replays and independent of event arrival order.

use crate::event::{EventType, GameEvent};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// AggregateKind
// =============================================================================

/// Which season aggregate table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    /// Per-player season averages
    Player,
    /// Per-team season averages
    Team,
}

impl AggregateKind {
    /// Both aggregate kinds, in sweep order
    pub const ALL: [AggregateKind; 2] = [AggregateKind::Player, AggregateKind::Team];

    /// Cache-key subject name for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Player => "player",
            AggregateKind::Team => "team",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// StatLine
// =============================================================================

/// The eight statistical categories as floats.
///
/// This is the shape serialized into the cache and returned by the query
/// surface; field names follow the published JSON contract.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatLine {
    /// Points scored
    pub points: f64,
    /// Rebounds
    pub rebounds: f64,
    /// Assists
    pub assists: f64,
    /// Steals
    pub steals: f64,
    /// Blocks
    pub blocks: f64,
    /// Personal fouls
    pub fouls: f64,
    /// Turnovers
    pub turnovers: f64,
    /// Minutes played
    pub minutes_played: f64,
}

impl StatLine {
    /// Arithmetic mean of the given game lines, column by column.
    ///
    /// Returns the zero line when `lines` is empty.
    pub fn average<'a, I>(lines: I) -> StatLine
    where
        I: IntoIterator<Item = &'a PlayerGameLine>,
    {
        let mut sum = StatLine::default();
        let mut count = 0usize;

        for line in lines {
            sum.points += f64::from(line.points);
            sum.rebounds += f64::from(line.rebounds);
            sum.assists += f64::from(line.assists);
            sum.steals += f64::from(line.steals);
            sum.blocks += f64::from(line.blocks);
            sum.fouls += f64::from(line.fouls);
            sum.turnovers += f64::from(line.turnovers);
            sum.minutes_played += line.minutes_played;
            count += 1;
        }

        if count == 0 {
            return sum;
        }

        let n = count as f64;
        StatLine {
            points: sum.points / n,
            rebounds: sum.rebounds / n,
            assists: sum.assists / n,
            steals: sum.steals / n,
            blocks: sum.blocks / n,
            turnovers: sum.turnovers / n,
            fouls: sum.fouls / n,
            minutes_played: sum.minutes_played / n,
        }
    }
}

// =============================================================================
// PlayerGameLine
// =============================================================================

/// One player's accumulated line for a single game date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameLine {
    /// Player identifier
    pub player: String,
    /// Team the player appeared for on this date
    pub team: String,
    /// Game date
    pub game_date: NaiveDate,
    /// Season label the game belongs to
    pub season: String,
    /// Points scored
    pub points: i32,
    /// Rebounds
    pub rebounds: i32,
    /// Assists
    pub assists: i32,
    /// Steals
    pub steals: i32,
    /// Blocks
    pub blocks: i32,
    /// Personal fouls (0–6)
    pub fouls: i32,
    /// Turnovers
    pub turnovers: i32,
    /// Minutes played (0–48)
    pub minutes_played: f64,
    /// Timestamp of the last "enter" that was paired with a later event
    pub entered: Option<DateTime<Utc>>,
}

impl PlayerGameLine {
    /// Fully re-aggregate a line from the event history of one
    /// player/team/date.
    ///
    /// Counters are the sum of `value` per event type. Minutes played pair
    /// each "enter" with the next later enter/exit timestamp in the same
    /// timeline and sum the elapsed intervals; an unmatched trailing
    /// "enter" contributes nothing.
    ///
    /// `events` must already be scoped to the player/team/date; order does
    /// not matter.
    pub fn from_events(
        player: &str,
        team: &str,
        game_date: NaiveDate,
        season: &str,
        events: &[GameEvent],
    ) -> PlayerGameLine {
        let mut line = PlayerGameLine {
            player: player.to_string(),
            team: team.to_string(),
            game_date,
            season: season.to_string(),
            points: 0,
            rebounds: 0,
            assists: 0,
            steals: 0,
            blocks: 0,
            fouls: 0,
            turnovers: 0,
            minutes_played: 0.0,
            entered: None,
        };

        for event in events {
            let value = event.value();
            match event.event {
                EventType::Shot => line.points += value,
                EventType::Rebound => line.rebounds += value,
                EventType::Assist => line.assists += value,
                EventType::Steal => line.steals += value,
                EventType::Block => line.blocks += value,
                EventType::Foul => line.fouls += value,
                EventType::Turnover => line.turnovers += value,
                EventType::Enter | EventType::Exit => {}
            }
        }

        let (minutes_played, entered) = substitution_minutes(events);
        line.minutes_played = minutes_played;
        line.entered = entered;

        line
    }
}

/// Sum the on-court intervals from a substitution timeline.
///
/// Each "enter" is paired with the immediately following enter/exit
/// timestamp (LEAD-style pairing over the sorted timeline, so a repeated
/// "enter" closes the previous interval). Returns the total minutes and the
/// timestamp of the last paired "enter".
fn substitution_minutes(events: &[GameEvent]) -> (f64, Option<DateTime<Utc>>) {
    let mut timeline: Vec<(DateTime<Utc>, EventType)> = events
        .iter()
        .filter(|e| !e.event.is_counting())
        .map(|e| (e.timestamp, e.event))
        .collect();
    timeline.sort_by_key(|(timestamp, _)| *timestamp);

    let mut seconds = 0i64;
    let mut last_paired_enter = None;

    for pair in timeline.windows(2) {
        let (timestamp, kind) = pair[0];
        if kind == EventType::Enter {
            seconds += (pair[1].0 - timestamp).num_seconds();
            last_paired_enter = Some(timestamp);
        }
    }

    (seconds as f64 / 60.0, last_paired_enter)
}

// =============================================================================
// SeasonAggregate
// =============================================================================

/// Season-level averages for one player or team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonAggregate {
    /// Player or team name, depending on the aggregate kind
    pub name: String,
    /// Season label
    pub season: String,
    /// Column-wise average over the subject's game lines for the season
    pub stats: StatLine,
    /// False while the row still needs cache propagation
    pub fresh: bool,
}

// =============================================================================
// Tests
// =============================================================================
