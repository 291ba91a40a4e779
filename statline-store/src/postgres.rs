//! PostgreSQL store implementation.
//!
//! All derived tables are re-derived inside the database itself: the
//! per-game line is rebuilt from the `events` table and the season
//! aggregates from `player_game_lines`, all inside one transaction, so
//! concurrent writers are serialized by ordinary row locking and the
//! result is independent of commit order.
//!
//! This module uses dynamic queries (sqlx::query) instead of compile-time
//! checked macros (sqlx::query!) to allow compilation without DATABASE_URL.

use crate::error::StoreError;
use crate::repository::StatStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use statline_domain::{AggregateKind, GameEvent, PlayerGameLine, SeasonAggregate, StatLine};
use tracing::debug;

// =============================================================================
// Schema
// =============================================================================

const CREATE_EVENTS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    player      text        NOT NULL,
    team        text        NOT NULL,
    "timestamp" timestamptz NOT NULL,
    event       text        NOT NULL CHECK (event IN
        ('shot', 'rebound', 'assist', 'steal', 'block', 'foul', 'turnover', 'enter', 'exit')),
    game_date   date        NOT NULL,
    value       int         NOT NULL DEFAULT 0,
    PRIMARY KEY (player, "timestamp")
)
"#;

const CREATE_GAME_LINES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS player_game_lines (
    player         text             NOT NULL,
    team           text             NOT NULL,
    game_date      date             NOT NULL,
    season         text             NOT NULL,
    points         int              NOT NULL DEFAULT 0 CHECK (points >= 0),
    rebounds       int              NOT NULL DEFAULT 0 CHECK (rebounds >= 0),
    assists        int              NOT NULL DEFAULT 0 CHECK (assists >= 0),
    steals         int              NOT NULL DEFAULT 0 CHECK (steals >= 0),
    blocks         int              NOT NULL DEFAULT 0 CHECK (blocks >= 0),
    fouls          int              NOT NULL DEFAULT 0 CHECK (fouls BETWEEN 0 AND 6),
    turnovers      int              NOT NULL DEFAULT 0 CHECK (turnovers >= 0),
    minutes_played double precision NOT NULL DEFAULT 0 CHECK (minutes_played BETWEEN 0 AND 48),
    entered        timestamptz,
    PRIMARY KEY (player, game_date)
)
"#;

const CREATE_PLAYER_SEASON_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS player_season_stats (
    player         text             NOT NULL,
    season         text             NOT NULL,
    points         double precision NOT NULL DEFAULT 0 CHECK (points >= 0),
    rebounds       double precision NOT NULL DEFAULT 0 CHECK (rebounds >= 0),
    assists        double precision NOT NULL DEFAULT 0 CHECK (assists >= 0),
    steals         double precision NOT NULL DEFAULT 0 CHECK (steals >= 0),
    blocks         double precision NOT NULL DEFAULT 0 CHECK (blocks >= 0),
    fouls          double precision NOT NULL DEFAULT 0 CHECK (fouls BETWEEN 0 AND 6),
    turnovers      double precision NOT NULL DEFAULT 0 CHECK (turnovers >= 0),
    minutes_played double precision NOT NULL DEFAULT 0 CHECK (minutes_played BETWEEN 0 AND 48),
    fresh          boolean          NOT NULL DEFAULT false,
    PRIMARY KEY (player, season)
)
"#;

const CREATE_TEAM_SEASON_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS team_season_stats (
    team           text             NOT NULL,
    season         text             NOT NULL,
    points         double precision NOT NULL DEFAULT 0 CHECK (points >= 0),
    rebounds       double precision NOT NULL DEFAULT 0 CHECK (rebounds >= 0),
    assists        double precision NOT NULL DEFAULT 0 CHECK (assists >= 0),
    steals         double precision NOT NULL DEFAULT 0 CHECK (steals >= 0),
    blocks         double precision NOT NULL DEFAULT 0 CHECK (blocks >= 0),
    fouls          double precision NOT NULL DEFAULT 0 CHECK (fouls BETWEEN 0 AND 6),
    turnovers      double precision NOT NULL DEFAULT 0 CHECK (turnovers >= 0),
    minutes_played double precision NOT NULL DEFAULT 0 CHECK (minutes_played BETWEEN 0 AND 48),
    fresh          boolean          NOT NULL DEFAULT false,
    PRIMARY KEY (team, season)
)
"#;

/// Create all four tables if they do not exist yet.
///
/// Safe to run on every startup.
pub async fn init_schema(pool: &PgPool) -> Result<(), StoreError> {
    for (table, sql) in [
        ("events", CREATE_EVENTS_SQL),
        ("player_game_lines", CREATE_GAME_LINES_SQL),
        ("player_season_stats", CREATE_PLAYER_SEASON_SQL),
        ("team_season_stats", CREATE_TEAM_SEASON_SQL),
    ] {
        sqlx::query(sql).execute(pool).await?;
        debug!(table, "table ready");
    }

    Ok(())
}

// =============================================================================
// Write statements
// =============================================================================

const UPSERT_EVENT_SQL: &str = r#"
INSERT INTO events (player, team, "timestamp", event, game_date, value)
VALUES ($1, $2, $3, $4, $5, $6)
ON CONFLICT (player, "timestamp") DO UPDATE SET
    event = EXCLUDED.event,
    value = EXCLUDED.value
"#;

/// Rebuild the whole per-game line for one player/team/date from the event
/// history. Counters are per-type sums of `value`; minutes pair each
/// 'enter' with the next later enter/exit timestamp (LEAD over the
/// substitution timeline), so unmatched trailing enters contribute nothing.
const RECOMPUTE_GAME_LINE_SQL: &str = r#"
WITH scoped AS (
    SELECT event, "timestamp", value
    FROM events
    WHERE player = $1 AND team = $2 AND game_date = $3
),
counters AS (
    SELECT
        COALESCE(SUM(value) FILTER (WHERE event = 'shot'), 0)::int     AS points,
        COALESCE(SUM(value) FILTER (WHERE event = 'rebound'), 0)::int  AS rebounds,
        COALESCE(SUM(value) FILTER (WHERE event = 'assist'), 0)::int   AS assists,
        COALESCE(SUM(value) FILTER (WHERE event = 'steal'), 0)::int    AS steals,
        COALESCE(SUM(value) FILTER (WHERE event = 'block'), 0)::int    AS blocks,
        COALESCE(SUM(value) FILTER (WHERE event = 'foul'), 0)::int     AS fouls,
        COALESCE(SUM(value) FILTER (WHERE event = 'turnover'), 0)::int AS turnovers
    FROM scoped
),
timeline AS (
    SELECT event, "timestamp",
           LEAD("timestamp") OVER (ORDER BY "timestamp") AS next_timestamp
    FROM scoped
    WHERE event IN ('enter', 'exit')
),
court_time AS (
    SELECT
        (COALESCE(SUM(EXTRACT(EPOCH FROM (next_timestamp - "timestamp"))), 0) / 60.0)::double precision
            AS minutes_played,
        MAX("timestamp") FILTER (WHERE next_timestamp IS NOT NULL) AS entered
    FROM timeline
    WHERE event = 'enter'
)
INSERT INTO player_game_lines
    (player, team, game_date, season,
     points, rebounds, assists, steals, blocks, fouls, turnovers,
     minutes_played, entered)
SELECT $1, $2, $3, $4,
       c.points, c.rebounds, c.assists, c.steals, c.blocks, c.fouls, c.turnovers,
       t.minutes_played, t.entered
FROM counters c, court_time t
ON CONFLICT (player, game_date) DO UPDATE SET
    points = EXCLUDED.points,
    rebounds = EXCLUDED.rebounds,
    assists = EXCLUDED.assists,
    steals = EXCLUDED.steals,
    blocks = EXCLUDED.blocks,
    fouls = EXCLUDED.fouls,
    turnovers = EXCLUDED.turnovers,
    minutes_played = EXCLUDED.minutes_played,
    entered = EXCLUDED.entered
"#;

const RECOMPUTE_PLAYER_SEASON_SQL: &str = r#"
INSERT INTO player_season_stats
    (player, season, points, rebounds, assists, steals, blocks, fouls, turnovers,
     minutes_played, fresh)
SELECT player, season,
       AVG(points)::double precision,
       AVG(rebounds)::double precision,
       AVG(assists)::double precision,
       AVG(steals)::double precision,
       AVG(blocks)::double precision,
       AVG(fouls)::double precision,
       AVG(turnovers)::double precision,
       AVG(minutes_played)::double precision,
       false
FROM player_game_lines
WHERE player = $1 AND season = $2
GROUP BY player, season
ON CONFLICT (player, season) DO UPDATE SET
    points = EXCLUDED.points,
    rebounds = EXCLUDED.rebounds,
    assists = EXCLUDED.assists,
    steals = EXCLUDED.steals,
    blocks = EXCLUDED.blocks,
    fouls = EXCLUDED.fouls,
    turnovers = EXCLUDED.turnovers,
    minutes_played = EXCLUDED.minutes_played,
    fresh = EXCLUDED.fresh
"#;

const RECOMPUTE_TEAM_SEASON_SQL: &str = r#"
INSERT INTO team_season_stats
    (team, season, points, rebounds, assists, steals, blocks, fouls, turnovers,
     minutes_played, fresh)
SELECT team, season,
       AVG(points)::double precision,
       AVG(rebounds)::double precision,
       AVG(assists)::double precision,
       AVG(steals)::double precision,
       AVG(blocks)::double precision,
       AVG(fouls)::double precision,
       AVG(turnovers)::double precision,
       AVG(minutes_played)::double precision,
       false
FROM player_game_lines
WHERE team = $1 AND season = $2
GROUP BY team, season
ON CONFLICT (team, season) DO UPDATE SET
    points = EXCLUDED.points,
    rebounds = EXCLUDED.rebounds,
    assists = EXCLUDED.assists,
    steals = EXCLUDED.steals,
    blocks = EXCLUDED.blocks,
    fouls = EXCLUDED.fouls,
    turnovers = EXCLUDED.turnovers,
    minutes_played = EXCLUDED.minutes_played,
    fresh = EXCLUDED.fresh
"#;

// =============================================================================
// Read statements
// =============================================================================

const SELECT_STALE_PLAYERS_SQL: &str = r#"
SELECT player AS name, season, points, rebounds, assists, steals, blocks, fouls,
       turnovers, minutes_played, fresh
FROM player_season_stats
WHERE fresh = false
ORDER BY player, season
"#;

const SELECT_STALE_TEAMS_SQL: &str = r#"
SELECT team AS name, season, points, rebounds, assists, steals, blocks, fouls,
       turnovers, minutes_played, fresh
FROM team_season_stats
WHERE fresh = false
ORDER BY team, season
"#;

const MARK_FRESH_PLAYER_SQL: &str =
    "UPDATE player_season_stats SET fresh = true WHERE player = $1 AND season = $2";
const MARK_FRESH_TEAM_SQL: &str =
    "UPDATE team_season_stats SET fresh = true WHERE team = $1 AND season = $2";

const SELECT_GAME_LINE_SQL: &str = r#"
SELECT player, team, game_date, season, points, rebounds, assists, steals, blocks,
       fouls, turnovers, minutes_played, entered
FROM player_game_lines
WHERE player = $1 AND game_date = $2
"#;

const SELECT_PLAYER_SEASON_SQL: &str = r#"
SELECT player AS name, season, points, rebounds, assists, steals, blocks, fouls,
       turnovers, minutes_played, fresh
FROM player_season_stats
WHERE player = $1 AND season = $2
"#;

const SELECT_TEAM_SEASON_SQL: &str = r#"
SELECT team AS name, season, points, rebounds, assists, steals, blocks, fouls,
       turnovers, minutes_played, fresh
FROM team_season_stats
WHERE team = $1 AND season = $2
"#;

// =============================================================================
// PgStatStore
// =============================================================================

/// PostgreSQL-backed store
pub struct PgStatStore {
    pool: PgPool,
}

impl PgStatStore {
    /// Create a store on top of an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool (for testing).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn upsert_event(
    tx: &mut Transaction<'_, Postgres>,
    event: &GameEvent,
    game_date: NaiveDate,
) -> Result<(), StoreError> {
    sqlx::query(UPSERT_EVENT_SQL)
        .bind(&event.player)
        .bind(&event.team)
        .bind(event.timestamp)
        .bind(event.event.as_str())
        .bind(game_date)
        .bind(event.value())
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn recompute_game_line(
    tx: &mut Transaction<'_, Postgres>,
    player: &str,
    team: &str,
    game_date: NaiveDate,
    season: &str,
) -> Result<(), StoreError> {
    sqlx::query(RECOMPUTE_GAME_LINE_SQL)
        .bind(player)
        .bind(team)
        .bind(game_date)
        .bind(season)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn recompute_season(
    tx: &mut Transaction<'_, Postgres>,
    kind: AggregateKind,
    name: &str,
    season: &str,
) -> Result<(), StoreError> {
    let sql = match kind {
        AggregateKind::Player => RECOMPUTE_PLAYER_SEASON_SQL,
        AggregateKind::Team => RECOMPUTE_TEAM_SEASON_SQL,
    };

    sqlx::query(sql)
        .bind(name)
        .bind(season)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

fn parse_aggregate_row(row: &PgRow) -> Result<SeasonAggregate, sqlx::Error> {
    Ok(SeasonAggregate {
        name: row.try_get("name")?,
        season: row.try_get("season")?,
        stats: StatLine {
            points: row.try_get("points")?,
            rebounds: row.try_get("rebounds")?,
            assists: row.try_get("assists")?,
            steals: row.try_get("steals")?,
            blocks: row.try_get("blocks")?,
            fouls: row.try_get("fouls")?,
            turnovers: row.try_get("turnovers")?,
            minutes_played: row.try_get("minutes_played")?,
        },
        fresh: row.try_get("fresh")?,
    })
}

fn parse_game_line_row(row: &PgRow) -> Result<PlayerGameLine, sqlx::Error> {
    Ok(PlayerGameLine {
        player: row.try_get("player")?,
        team: row.try_get("team")?,
        game_date: row.try_get("game_date")?,
        season: row.try_get("season")?,
        points: row.try_get("points")?,
        rebounds: row.try_get("rebounds")?,
        assists: row.try_get("assists")?,
        steals: row.try_get("steals")?,
        blocks: row.try_get("blocks")?,
        fouls: row.try_get("fouls")?,
        turnovers: row.try_get("turnovers")?,
        minutes_played: row.try_get("minutes_played")?,
        entered: row.try_get::<Option<DateTime<Utc>>, _>("entered")?,
    })
}

#[async_trait]
impl StatStore for PgStatStore {
    async fn apply_event(&self, event: &GameEvent) -> Result<(), StoreError> {
        let game_date = event.game_date();
        let season = event.season();

        // Dropping the transaction on any error rolls everything back.
        let mut tx = self.pool.begin().await?;

        upsert_event(&mut tx, event, game_date).await?;
        recompute_game_line(&mut tx, &event.player, &event.team, game_date, &season).await?;
        recompute_season(&mut tx, AggregateKind::Player, &event.player, &season).await?;
        recompute_season(&mut tx, AggregateKind::Team, &event.team, &season).await?;

        tx.commit().await?;

        debug!(
            player = %event.player,
            team = %event.team,
            kind = %event.event,
            %season,
            "event applied"
        );

        Ok(())
    }

    async fn find_stale(&self, kind: AggregateKind) -> Result<Vec<SeasonAggregate>, StoreError> {
        let sql = match kind {
            AggregateKind::Player => SELECT_STALE_PLAYERS_SQL,
            AggregateKind::Team => SELECT_STALE_TEAMS_SQL,
        };

        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| parse_aggregate_row(row).map_err(StoreError::from))
            .collect()
    }

    async fn mark_fresh(
        &self,
        kind: AggregateKind,
        name: &str,
        season: &str,
    ) -> Result<(), StoreError> {
        let sql = match kind {
            AggregateKind::Player => MARK_FRESH_PLAYER_SQL,
            AggregateKind::Team => MARK_FRESH_TEAM_SQL,
        };

        sqlx::query(sql)
            .bind(name)
            .bind(season)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn game_line(
        &self,
        player: &str,
        game_date: NaiveDate,
    ) -> Result<Option<PlayerGameLine>, StoreError> {
        let row = sqlx::query(SELECT_GAME_LINE_SQL)
            .bind(player)
            .bind(game_date)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(|row| parse_game_line_row(row).map_err(StoreError::from))
            .transpose()
    }

    async fn season_aggregate(
        &self,
        kind: AggregateKind,
        name: &str,
        season: &str,
    ) -> Result<Option<SeasonAggregate>, StoreError> {
        let sql = match kind {
            AggregateKind::Player => SELECT_PLAYER_SEASON_SQL,
            AggregateKind::Team => SELECT_TEAM_SEASON_SQL,
        };

        let row = sqlx::query(sql)
            .bind(name)
            .bind(season)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(|row| parse_aggregate_row(row).map_err(StoreError::from))
            .transpose()
    }
}
