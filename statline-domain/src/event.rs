//! Game Events
//!
//! Events are immutable records of observed on-court actions.
//! An event is uniquely identified by (player, timestamp); a later
//! submission with the same key is a correction that replaces the earlier
//! event's type and value.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation errors for inbound events
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required identifier field is empty
    #[error("'{0}' is not specified")]
    MissingField(&'static str),

    /// Points are out of range for the event type
    #[error("invalid 'points' value for '{event}' event: {points}")]
    InvalidPoints {
        /// The event type the points were submitted with
        event: EventType,
        /// The rejected points value
        points: i32,
    },
}

// =============================================================================
// EventType
// =============================================================================

/// The nine recognized event types.
///
/// `Enter`/`Exit` are substitutions and only contribute to minutes played;
/// all other types increment a per-game counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// A made shot worth 1, 2, or 3 points
    Shot,
    /// A rebound
    Rebound,
    /// An assist
    Assist,
    /// A steal
    Steal,
    /// A block
    Block,
    /// A personal foul
    Foul,
    /// A turnover
    Turnover,
    /// Substitution in ("sub in", for minutes played)
    Enter,
    /// Substitution out ("sub out", for minutes played)
    Exit,
}

impl EventType {
    /// All recognized event types
    pub const ALL: [EventType; 9] = [
        EventType::Shot,
        EventType::Rebound,
        EventType::Assist,
        EventType::Steal,
        EventType::Block,
        EventType::Foul,
        EventType::Turnover,
        EventType::Enter,
        EventType::Exit,
    ];

    /// Wire/storage name of the event type
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Shot => "shot",
            EventType::Rebound => "rebound",
            EventType::Assist => "assist",
            EventType::Steal => "steal",
            EventType::Block => "block",
            EventType::Foul => "foul",
            EventType::Turnover => "turnover",
            EventType::Enter => "enter",
            EventType::Exit => "exit",
        }
    }

    /// True for event types that increment a per-game counter
    /// (everything except substitutions).
    pub fn is_counting(&self) -> bool {
        !matches!(self, EventType::Enter | EventType::Exit)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// GameEvent
// =============================================================================

/// One observed action by one player.
///
/// # Invariants
/// - (player, timestamp) is the identity; re-submitting the same key
///   corrects the stored event type and value
/// - `points` is only meaningful for `shot` events and must be 1–3 there;
///   every other event type requires 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Player identifier
    pub player: String,
    /// Team identifier
    pub team: String,
    /// When the action was observed (second precision)
    pub timestamp: DateTime<Utc>,
    /// What happened
    pub event: EventType,
    /// Point value, only relevant for `shot` events
    #[serde(default)]
    pub points: i32,
}

impl GameEvent {
    /// Check the field-level validation rules.
    ///
    /// Missing or unknown `timestamp`/`event` fields are already rejected
    /// by the typed JSON decode, so only the remaining rules live here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.player.trim().is_empty() {
            return Err(ValidationError::MissingField("player"));
        }

        if self.team.trim().is_empty() {
            return Err(ValidationError::MissingField("team"));
        }

        let points_ok = match self.event {
            EventType::Shot => (1..=3).contains(&self.points),
            _ => self.points == 0,
        };
        if !points_ok {
            return Err(ValidationError::InvalidPoints {
                event: self.event,
                points: self.points,
            });
        }

        Ok(())
    }

    /// Numeric value of the event: 0 for enter/exit, the point value for a
    /// shot, and 1 for every other counting event.
    pub fn value(&self) -> i32 {
        match self.event {
            EventType::Enter | EventType::Exit => 0,
            EventType::Shot => self.points,
            _ => 1,
        }
    }

    /// Calendar date of the game the event belongs to.
    pub fn game_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Season label the event belongs to, e.g. "2024-25".
    pub fn season(&self) -> String {
        season_of(self.timestamp)
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.player, self.team, self.timestamp, self.event, self.points
        )
    }
}

/// Season label for a point in time, e.g. "2024-25".
///
/// The season boundary is October 1: an event dated before October belongs
/// to the season that started the previous calendar year. The label is the
/// start year followed by the two-digit end year ("1999-00" for the season
/// starting in 1999).
pub fn season_of(timestamp: DateTime<Utc>) -> String {
    let mut start_year = timestamp.year();
    if timestamp.month() < 10 {
        start_year -= 1;
    }
    format!("{}-{:02}", start_year, (start_year + 1) % 100)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(kind: EventType, points: i32) -> GameEvent {
        GameEvent {
            player: "LeBron James".to_string(),
            team: "Los Angeles Lakers".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 5, 23, 15, 0, 0).unwrap(),
            event: kind,
            points,
        }
    }

    #[test]
    fn test_validate_accepts_all_counting_events() {
        for kind in EventType::ALL {
            let points = if kind == EventType::Shot { 2 } else { 0 };
            assert!(event(kind, points).validate().is_ok(), "{kind} rejected");
        }
    }

    #[test]
    fn test_validate_rejects_empty_player() {
        let mut e = event(EventType::Rebound, 0);
        e.player = String::new();
        assert_eq!(e.validate(), Err(ValidationError::MissingField("player")));
    }

    #[test]
    fn test_validate_rejects_empty_team() {
        let mut e = event(EventType::Rebound, 0);
        e.team = "  ".to_string();
        assert_eq!(e.validate(), Err(ValidationError::MissingField("team")));
    }

    #[test]
    fn test_validate_rejects_shot_points_out_of_range() {
        for points in [0, 4, -1] {
            let result = event(EventType::Shot, points).validate();
            assert_eq!(
                result,
                Err(ValidationError::InvalidPoints {
                    event: EventType::Shot,
                    points,
                })
            );
        }
    }

    #[test]
    fn test_validate_rejects_points_on_non_shot() {
        let result = event(EventType::Foul, 1).validate();
        assert_eq!(
            result,
            Err(ValidationError::InvalidPoints {
                event: EventType::Foul,
                points: 1,
            })
        );
    }

    #[test]
    fn test_value_per_event_type() {
        assert_eq!(event(EventType::Shot, 3).value(), 3);
        assert_eq!(event(EventType::Shot, 1).value(), 1);
        assert_eq!(event(EventType::Rebound, 0).value(), 1);
        assert_eq!(event(EventType::Foul, 0).value(), 1);
        assert_eq!(event(EventType::Enter, 0).value(), 0);
        assert_eq!(event(EventType::Exit, 0).value(), 0);
    }

    #[test]
    fn test_game_date() {
        let e = event(EventType::Assist, 0);
        assert_eq!(e.game_date().to_string(), "2025-05-23");
    }

    #[test]
    fn test_season_boundary() {
        // September 30 still belongs to the season started the previous year
        let before = Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap();
        assert_eq!(season_of(before), "2023-24");

        // October 1 starts a new season
        let after = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();
        assert_eq!(season_of(after), "2024-25");
    }

    #[test]
    fn test_season_midwinter_belongs_to_previous_start_year() {
        let january = Utc.with_ymd_and_hms(2025, 1, 15, 19, 30, 0).unwrap();
        assert_eq!(season_of(january), "2024-25");
    }

    #[test]
    fn test_season_label_pads_end_year() {
        let december_1999 = Utc.with_ymd_and_hms(1999, 12, 25, 12, 0, 0).unwrap();
        assert_eq!(season_of(december_1999), "1999-00");
    }

    #[test]
    fn test_decode_defaults_points_to_zero() {
        let e: GameEvent = serde_json::from_str(
            r#"{"player":"P","team":"T","timestamp":"2025-05-23T15:00:00Z","event":"rebound"}"#,
        )
        .unwrap();
        assert_eq!(e.points, 0);
        assert_eq!(e.event, EventType::Rebound);
    }

    #[test]
    fn test_decode_rejects_unknown_event_type() {
        let result: Result<GameEvent, _> = serde_json::from_str(
            r#"{"player":"P","team":"T","timestamp":"2025-05-23T15:00:00Z","event":"dunk"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_missing_timestamp() {
        let result: Result<GameEvent, _> =
            serde_json::from_str(r#"{"player":"P","team":"T","event":"shot","points":2}"#);
        assert!(result.is_err());
    }
}
