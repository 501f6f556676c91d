//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use ecostream_core::simulator::PolicySimulator;
use ecostream_core::state::StateStore;
use ecostream_observer::router::build_router;
use ecostream_observer::state::AppState;
use ecostream_types::{AlertSeverity, NewsItem};
use serde_json::Value;
use tower::ServiceExt;

fn news(title: &str) -> NewsItem {
    NewsItem {
        title: title.to_owned(),
        link: Some(format!("https://example.com/{}", title.len())),
        summary: None,
        published: Utc::now(),
    }
}

async fn make_test_state() -> Arc<AppState> {
    let store = Arc::new(StateStore::new("Noida"));
    store.update_metrics(350.0, 40.0, 66.0, true).await;
    store
        .update_news(vec![
            news("Delhi smog worsens"),
            news("Cricket final tonight"),
            news("Noida air quality dips"),
        ])
        .await;
    Arc::new(AppState::new(store, PolicySimulator::default()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Health and live metrics
// =========================================================================

#[tokio::test]
async fn test_health() {
    let (status, json) = get(make_test_state().await, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "EcoStream AI backend running");
}

#[tokio::test]
async fn test_live_metrics_returns_snapshot() {
    let (status, json) = get(make_test_state().await, "/live-metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["location"], "Noida");
    assert_eq!(json["aqi"], 350.0);
    assert_eq!(json["temperature"], 40.0);
    assert_eq!(json["stress"], 66.0);
    assert_eq!(json["alert"], true);
    assert!(json["timestamp"].is_string());
    assert_eq!(json["news"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_live_metrics_before_first_cycle() {
    let store = Arc::new(StateStore::new("Noida"));
    let state = Arc::new(AppState::new(store, PolicySimulator::default()));
    let (status, json) = get(state, "/api/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["aqi"], 0.0);
    assert_eq!(json["alert"], false);
    assert!(json["timestamp"].is_null());
    assert_eq!(json["news"], Value::Array(Vec::new()));
}

// =========================================================================
// Explanation
// =========================================================================

#[tokio::test]
async fn test_explain_matches_titles_case_insensitively() {
    let (status, json) = get(make_test_state().await, "/api/explain?q=Why%20is%20the%20AIR%20bad").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["location"], "Noida");
    assert_eq!(json["alert"], true);
    let context = json["news_context"].as_array().unwrap();
    assert_eq!(context.len(), 1);
    assert_eq!(context[0]["title"], "Noida air quality dips");
    assert_eq!(
        json["summary"],
        "Environmental stress is high in Noida. Immediate attention recommended."
    );
}

#[tokio::test]
async fn test_explain_post_body() {
    let state = make_test_state().await;
    let response = build_router(state)
        .oneshot(
            Request::post("/api/explain")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"query":"smog"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["news_context"][0]["title"], "Delhi smog worsens");
}

#[tokio::test]
async fn test_explain_blank_query_answers_without_context() {
    let (status, json) = get(make_test_state().await, "/api/explain?q=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["news_context"], Value::Array(Vec::new()));
    assert_eq!(
        json["summary"],
        "Environmental stress is high in Noida. Immediate attention recommended."
    );

    let (status, json) = get(make_test_state().await, "/api/explain?q=%20%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["news_context"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn test_explain_missing_query_is_bad_request() {
    let (status, json) = get(make_test_state().await, "/api/explain").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

// =========================================================================
// Simulation
// =========================================================================

#[tokio::test]
async fn test_simulate_projects_reduction() {
    let (status, json) = get(make_test_state().await, "/api/simulate?reduction=50").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current_aqi"], 350.0);
    assert_eq!(json["projected_aqi"], 280.0);
    assert_eq!(json["improvement_percent"], 20.0);
}

#[tokio::test]
async fn test_simulate_rejects_out_of_range() {
    let (status, json) = get(make_test_state().await, "/api/simulate?reduction=150").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("150"));
}

// =========================================================================
// Alerts
// =========================================================================

#[tokio::test]
async fn test_list_and_acknowledge_alerts() {
    let state = make_test_state().await;
    let id = {
        let mut alerts = state.alert_store.write().await;
        alerts.raise(AlertSeverity::Warning, "stress high".to_owned(), 250.0, 72.0);
        alerts.raise(AlertSeverity::Critical, "aqi high".to_owned(), 350.0, 66.0)
    };

    let (status, json) = get(Arc::clone(&state), "/api/alerts?severity=critical").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["alerts"][0]["message"], "aqi high");

    let response = build_router(Arc::clone(&state))
        .oneshot(
            Request::post(format!("/api/alerts/{id}/acknowledge"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, json) = get(state, "/api/alerts?acknowledged=false").await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["alerts"][0]["message"], "stress high");
}

#[tokio::test]
async fn test_acknowledge_unknown_alert_is_not_found() {
    let state = make_test_state().await;
    let response = build_router(state)
        .oneshot(
            Request::post(format!("/api/alerts/{}/acknowledge", uuid::Uuid::nil()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_acknowledge_invalid_uuid() {
    let state = make_test_state().await;
    let response = build_router(state)
        .oneshot(
            Request::post("/api/alerts/not-a-uuid/acknowledge")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_severity_filter_rejected() {
    let (status, _) = get(make_test_state().await, "/api/alerts?severity=info").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =========================================================================
// Broadcast
// =========================================================================

#[tokio::test]
async fn test_broadcast_without_subscribers_is_zero() {
    let state = make_test_state().await;
    let outcome = ecostream_types::CycleOutcome {
        aqi: 350.0,
        temperature: 40.0,
        stress: 66.0,
        alert: true,
        risk_level: ecostream_types::RiskLevel::High,
        timestamp: Utc::now(),
    };
    assert_eq!(state.broadcast(&outcome), 0);

    let mut rx = state.subscribe();
    assert_eq!(state.broadcast(&outcome), 1);
    assert_eq!(rx.recv().await.unwrap(), outcome);
}
