//! Cache key format
//!
//! `{subject}:{name}:{season}` with subject ∈ {player, team}. This is the
//! published contract between the synchronization sweep and the read-only
//! query surface; both sides format keys through this type.

use statline_domain::AggregateKind;
use std::fmt;

/// Address of one season aggregate snapshot in the cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Aggregate kind (the "subject" segment of the key)
    pub kind: AggregateKind,
    /// Player or team name
    pub name: String,
    /// Season label
    pub season: String,
}

impl CacheKey {
    /// Build a key for one subject and season.
    pub fn new(kind: AggregateKind, name: impl Into<String>, season: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            season: season.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.name, self.season)
    }
}
