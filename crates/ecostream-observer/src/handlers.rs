//! REST API endpoint handlers for the Observer server.
//!
//! All handlers read an owned copy of the live snapshot from the shared
//! [`AppState`]; none of them write to it.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Health check |
//! | `GET` | `/live-metrics` | Current snapshot (alias `/api/snapshot`) |
//! | `GET` | `/api/explain?q=` | Keyword explanation of the current state |
//! | `POST` | `/api/explain` | Same, with `{"query": ...}` body |
//! | `GET` | `/api/simulate?reduction=` | Traffic-reduction projection |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use ecostream_core::explain;
use ecostream_types::Explanation;

use crate::error::ObserverError;
use crate::state::AppState;

/// Body of the health check.
pub const HEALTH_STATUS: &str = "EcoStream AI backend running";

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/explain`.
#[derive(Debug, serde::Deserialize)]
pub struct ExplainQuery {
    /// Free-text question.
    pub q: Option<String>,
}

/// Body of `POST /api/explain`.
#[derive(Debug, serde::Deserialize)]
pub struct ExplainRequest {
    /// Free-text question.
    pub query: String,
}

/// Query parameters for `GET /api/simulate`.
#[derive(Debug, serde::Deserialize)]
pub struct SimulateQuery {
    /// Traffic reduction in percent, `0` to `100`.
    pub reduction: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /` -- liveness check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": HEALTH_STATUS }))
}

/// `GET /live-metrics` -- the current snapshot.
///
/// Before the first cycle this is the start-of-process snapshot: zero
/// metrics, no news and a `null` timestamp.
pub async fn live_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.get_state().await)
}

/// `GET /api/explain?q=` -- explain the current state for a question.
pub async fn explain_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExplainQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let query = params
        .q
        .ok_or_else(|| ObserverError::InvalidQuery("missing parameter q".to_owned()))?;
    answer(&state, &query).await
}

/// `POST /api/explain` -- explain the current state for a question.
pub async fn explain_post(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExplainRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    answer(&state, &body.query).await
}

/// A blank query is answered normally with an empty news context.
async fn answer(state: &AppState, query: &str) -> Result<Json<Explanation>, ObserverError> {
    let snapshot = state.store.get_state().await;
    Ok(Json(explain::explain(query, &snapshot)))
}

/// `GET /api/simulate?reduction=` -- project a traffic reduction.
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SimulateQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let reduction = params
        .reduction
        .ok_or_else(|| ObserverError::InvalidQuery("missing parameter reduction".to_owned()))?;
    let snapshot = state.store.get_state().await;
    let projection = state
        .simulator
        .simulate_traffic_reduction(&snapshot, reduction)?;
    Ok(Json(projection))
}
