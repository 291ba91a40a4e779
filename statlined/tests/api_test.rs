//! HTTP API integration tests.
//!
//! The router is exercised with `tower::ServiceExt::oneshot` against the
//! in-memory store and cache, so the full ingestion-to-lookup path runs
//! without PostgreSQL or Redis.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use statline_cache::MemoryCache;
use statline_pipeline::EventProcessor;
use statline_store::MemoryStore;
use statlined::{create_router, ApiState};

fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());

    let state = Arc::new(ApiState {
        processor: EventProcessor::new(store, cache.clone()),
        cache,
    });

    create_router(state)
}

async fn post_event(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/event")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();

    let (status, body) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ingested_shot_is_served_from_the_cache() {
    let app = test_app();

    let (status, _) = post_event(
        &app,
        json!({
            "player": "LeBron James",
            "team": "Los Angeles Lakers",
            "timestamp": "2025-01-15T19:00:00Z",
            "event": "shot",
            "points": 3
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(
        &app,
        "/api/v1/statistics/player/LeBron%20James/season/2024-25",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"], 3.0);
    assert_eq!(body["minutesPlayed"], 0.0);

    let (status, body) = get_json(
        &app,
        "/api/v1/statistics/team/Los%20Angeles%20Lakers/season/2024-25",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"], 3.0);
}

#[tokio::test]
async fn test_shot_with_four_points_is_rejected() {
    let app = test_app();

    let (status, body) = post_event(
        &app,
        json!({
            "player": "LeBron James",
            "team": "Los Angeles Lakers",
            "timestamp": "2025-01-15T19:00:00Z",
            "event": "shot",
            "points": 4
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("points"));
}

#[tokio::test]
async fn test_foul_with_points_is_rejected() {
    let app = test_app();

    let (status, _) = post_event(
        &app,
        json!({
            "player": "LeBron James",
            "team": "Los Angeles Lakers",
            "timestamp": "2025-01-15T19:00:00Z",
            "event": "foul",
            "points": 1
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_team_is_rejected() {
    let app = test_app();

    let (status, body) = post_event(
        &app,
        json!({
            "player": "LeBron James",
            "timestamp": "2025-01-15T19:00:00Z",
            "event": "rebound"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("decode"));
}

#[tokio::test]
async fn test_unknown_event_type_is_rejected() {
    let app = test_app();

    let (status, _) = post_event(
        &app,
        json!({
            "player": "LeBron James",
            "team": "Los Angeles Lakers",
            "timestamp": "2025-01-15T19:00:00Z",
            "event": "dunk"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_statistics_miss_is_not_found() {
    let app = test_app();

    let (status, body) = get_json(&app, "/api/v1/statistics/player/Nobody/season/2024-25").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Nobody"));
}

#[tokio::test]
async fn test_event_endpoint_rejects_get() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/event")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_correction_is_visible_in_the_cache() {
    let app = test_app();

    let event = json!({
        "player": "LeBron James",
        "team": "Los Angeles Lakers",
        "timestamp": "2025-01-15T19:00:00Z",
        "event": "shot",
        "points": 3
    });
    post_event(&app, event).await;

    let correction = json!({
        "player": "LeBron James",
        "team": "Los Angeles Lakers",
        "timestamp": "2025-01-15T19:00:00Z",
        "event": "shot",
        "points": 2
    });
    let (status, _) = post_event(&app, correction).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(
        &app,
        "/api/v1/statistics/player/LeBron%20James/season/2024-25",
    )
    .await;
    assert_eq!(body["points"], 2.0);
}
