//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::alerts;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- health check
/// - `GET /live-metrics` and `GET /api/snapshot` -- current snapshot
/// - `GET /api/explain?q=` and `POST /api/explain` -- explanation
/// - `GET /api/simulate?reduction=` -- traffic-reduction projection
/// - `GET /api/alerts` -- alert history
/// - `POST /api/alerts/{id}/acknowledge` -- acknowledge an alert
/// - `GET /ws/metrics` -- `WebSocket` cycle outcome stream
///
/// CORS allows any origin so the dashboard can be served separately.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health))
        // Live state
        .route("/live-metrics", get(handlers::live_metrics))
        .route("/api/snapshot", get(handlers::live_metrics))
        .route(
            "/api/explain",
            get(handlers::explain_query).post(handlers::explain_post),
        )
        .route("/api/simulate", get(handlers::simulate))
        // Alerts
        .route("/api/alerts", get(alerts::list_alerts))
        .route("/api/alerts/{id}/acknowledge", post(alerts::acknowledge_alert))
        // WebSocket
        .route("/ws/metrics", get(ws::ws_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
