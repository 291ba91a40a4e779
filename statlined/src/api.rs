//! HTTP API for the statline daemon.
//!
//! Provides REST endpoints for:
//! - Health check
//! - Event ingestion (the write path)
//! - Season statistics lookup (pure cache reads)

use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use statline_cache::{CacheKey, StatCache};
use statline_domain::{AggregateKind, GameEvent, StatLine};
use statline_pipeline::{EventProcessor, PipelineError};
use statline_store::StatStore;

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState<S: StatStore + 'static, C: StatCache + 'static> {
    /// The write path
    pub processor: EventProcessor<S, C>,
    /// The read path (statistics lookups never touch the store)
    pub cache: Arc<C>,
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router<S, C>(state: Arc<ApiState<S, C>>) -> Router
where
    S: StatStore + 'static,
    C: StatCache + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/event", post(ingest_handler))
        .route(
            "/api/v1/statistics/player/:name/season/:season",
            get(player_statistics_handler),
        )
        .route(
            "/api/v1/statistics/team/:name/season/:season",
            get(team_statistics_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Ingest one game event.
async fn ingest_handler<S, C>(
    State(state): State<Arc<ApiState<S, C>>>,
    payload: Result<Json<GameEvent>, JsonRejection>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)>
where
    S: StatStore + 'static,
    C: StatCache + 'static,
{
    let Json(event) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("failed to decode event: {}", rejection.body_text()),
            }),
        )
    })?;

    state
        .processor
        .process(&event)
        .await
        .map_err(to_error_response)?;

    Ok(StatusCode::OK)
}

/// Look up a player's season statistics.
async fn player_statistics_handler<S, C>(
    State(state): State<Arc<ApiState<S, C>>>,
    Path((name, season)): Path<(String, String)>,
) -> Result<Json<StatLine>, (StatusCode, Json<ErrorResponse>)>
where
    S: StatStore + 'static,
    C: StatCache + 'static,
{
    statistics_response(&state, AggregateKind::Player, name, season).await
}

/// Look up a team's season statistics.
async fn team_statistics_handler<S, C>(
    State(state): State<Arc<ApiState<S, C>>>,
    Path((name, season)): Path<(String, String)>,
) -> Result<Json<StatLine>, (StatusCode, Json<ErrorResponse>)>
where
    S: StatStore + 'static,
    C: StatCache + 'static,
{
    statistics_response(&state, AggregateKind::Team, name, season).await
}

/// Shared cache lookup behind both statistics routes.
async fn statistics_response<S, C>(
    state: &ApiState<S, C>,
    kind: AggregateKind,
    name: String,
    season: String,
) -> Result<Json<StatLine>, (StatusCode, Json<ErrorResponse>)>
where
    S: StatStore + 'static,
    C: StatCache + 'static,
{
    let key = CacheKey::new(kind, name, season);

    match state.cache.get(&key).await {
        Ok(Some(stats)) => Ok(Json(stats)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!(
                    "statistics for {} \"{}\" in season {} not found",
                    key.kind, key.name, key.season
                ),
            }),
        )),
        Err(error) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("failed to read cache key \"{}\": {}", key, error),
            }),
        )),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn to_error_response(error: PipelineError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
        PipelineError::Transaction(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}
