//! Alert history for the live metrics.
//!
//! The snapshot only carries the current alert flag. This module keeps a
//! bounded record of each time the flag was raised so operators can see
//! and acknowledge past incidents.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/alerts` | List alerts (filters: `severity`, `acknowledged`, `limit`) |
//! | `POST` | `/api/alerts/{id}/acknowledge` | Acknowledge an alert |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use ecostream_types::{AlertId, AlertSeverity};
use uuid::Uuid;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Alert records
// ---------------------------------------------------------------------------

/// A single raised alert.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Alert {
    /// Unique alert identifier.
    pub id: AlertId,
    /// Severity of the alert.
    pub severity: AlertSeverity,
    /// Human-readable message.
    pub message: String,
    /// AQI of the cycle that raised the alert.
    pub aqi: f64,
    /// Stress score of the cycle that raised the alert.
    pub stress: f64,
    /// Whether an operator has acknowledged this alert.
    pub acknowledged: bool,
    /// When the alert was raised.
    pub created_at: DateTime<Utc>,
}

/// Maximum alerts kept in memory.
pub const MAX_ALERTS: usize = 500;

/// In-memory alert store, newest first.
#[derive(Debug, Clone, Default)]
pub struct AlertStore {
    alerts: Vec<Alert>,
}

impl AlertStore {
    /// Create an empty alert store.
    pub const fn new() -> Self {
        Self { alerts: Vec::new() }
    }

    /// Add an alert, dropping the oldest beyond [`MAX_ALERTS`].
    pub fn push(&mut self, alert: Alert) {
        self.alerts.insert(0, alert);
        self.alerts.truncate(MAX_ALERTS);
    }

    /// All alerts, newest first.
    pub fn all(&self) -> &[Alert] {
        &self.alerts
    }

    /// Acknowledge an alert by ID. Returns `false` if the ID is unknown.
    pub fn acknowledge(&mut self, id: AlertId) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.acknowledged = true;
                true
            }
            None => false,
        }
    }

    /// Alerts not yet acknowledged.
    pub fn unacknowledged(&self) -> Vec<&Alert> {
        self.alerts.iter().filter(|a| !a.acknowledged).collect()
    }

    /// Create and store a new alert, returning its ID.
    pub fn raise(
        &mut self,
        severity: AlertSeverity,
        message: String,
        aqi: f64,
        stress: f64,
    ) -> AlertId {
        let id = AlertId::new();
        self.push(Alert {
            id,
            severity,
            message,
            aqi,
            stress,
            acknowledged: false,
            created_at: Utc::now(),
        });
        id
    }
}

// ---------------------------------------------------------------------------
// REST Handlers
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/alerts`.
#[derive(Debug, serde::Deserialize)]
pub struct AlertsQuery {
    /// Filter by severity (`warning` or `critical`).
    pub severity: Option<String>,
    /// Filter by acknowledged status (`true` or `false`).
    pub acknowledged: Option<String>,
    /// Maximum number of alerts to return (default 100, at most 500).
    pub limit: Option<usize>,
}

/// `GET /api/alerts` -- list alerts with optional filtering.
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let limit = params.limit.unwrap_or(100).min(MAX_ALERTS);

    let severity_filter = params
        .severity
        .as_deref()
        .map(|s| match s {
            "warning" => Ok(AlertSeverity::Warning),
            "critical" => Ok(AlertSeverity::Critical),
            other => Err(ObserverError::InvalidQuery(format!(
                "unknown severity: {other}"
            ))),
        })
        .transpose()?;

    let acknowledged_filter = params
        .acknowledged
        .as_deref()
        .map(|a| match a {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(ObserverError::InvalidQuery(format!(
                "acknowledged must be true or false, got {other}"
            ))),
        })
        .transpose()?;

    let alert_store = state.alert_store.read().await;
    let alerts: Vec<&Alert> = alert_store
        .all()
        .iter()
        .filter(|a| severity_filter.is_none_or(|s| a.severity == s))
        .filter(|a| acknowledged_filter.is_none_or(|ack| a.acknowledged == ack))
        .take(limit)
        .collect();

    Ok(Json(serde_json::json!({
        "count": alerts.len(),
        "unacknowledged": alert_store.unacknowledged().len(),
        "alerts": alerts,
    })))
}

/// `POST /api/alerts/{id}/acknowledge` -- acknowledge an alert.
pub async fn acknowledge_alert(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = id_str
        .parse::<Uuid>()
        .map(AlertId::from)
        .map_err(|e| ObserverError::InvalidUuid(format!("{id_str}: {e}")))?;

    let mut alert_store = state.alert_store.write().await;
    if alert_store.acknowledge(id) {
        Ok(Json(serde_json::json!({
            "ok": true,
            "message": format!("Alert {id} acknowledged"),
        })))
    } else {
        Err(ObserverError::NotFound(format!("alert {id}")))
    }
}
