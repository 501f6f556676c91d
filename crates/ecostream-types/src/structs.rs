//! Core records of the monitor: readings, news, the live snapshot, and
//! the derived views served by the observer API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::RiskLevel;

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// One sensor reading produced by a reading source each cycle.
///
/// Readings are ephemeral: the cycle scores them and only the resulting
/// metrics are kept in the [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Name of the monitored location.
    pub location: String,
    /// Air Quality Index.
    pub aqi: f64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
}

/// A news headline fetched from the news source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewsItem {
    /// Headline text.
    pub title: String,
    /// Link to the full article, when the feed provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Short summary, when the feed provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Publication time (fetch time when the feed omits it).
    pub published: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Live state
// ---------------------------------------------------------------------------

/// The single current-state record shared across the process.
///
/// Metric fields always belong to the same completed cycle. The news
/// list is replaced wholesale on each refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Name of the monitored location.
    pub location: String,
    /// Latest Air Quality Index.
    pub aqi: f64,
    /// Latest temperature in degrees Celsius.
    pub temperature: f64,
    /// Latest stress score in `[0, 100]`.
    pub stress: f64,
    /// Whether the latest cycle crossed an alert threshold.
    pub alert: bool,
    /// When the metrics were last written; `None` before the first cycle.
    pub timestamp: Option<DateTime<Utc>>,
    /// Latest news batch, in feed order.
    pub news: Vec<NewsItem>,
}

impl Snapshot {
    /// Create the start-of-process snapshot: zero metrics and no news.
    pub fn empty(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            aqi: 0.0,
            temperature: 0.0,
            stress: 0.0,
            alert: false,
            timestamp: None,
            news: Vec::new(),
        }
    }
}

/// Result of one completed scoring cycle.
///
/// Returned by the cycle orchestrator for logging and pushed to
/// `WebSocket` subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CycleOutcome {
    /// Air Quality Index that was scored.
    pub aqi: f64,
    /// Temperature that was scored.
    pub temperature: f64,
    /// Resulting stress score.
    pub stress: f64,
    /// Resulting alert flag.
    pub alert: bool,
    /// Qualitative band of the stress score.
    pub risk_level: RiskLevel,
    /// When the metrics were written to the snapshot.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Answer to a free-text explanation query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Explanation {
    /// Name of the monitored location.
    pub location: String,
    /// Current Air Quality Index.
    pub aqi: f64,
    /// Current stress score.
    pub stress: f64,
    /// Current alert flag.
    pub alert: bool,
    /// News items whose titles match the query.
    pub news_context: Vec<NewsItem>,
    /// Canned summary selected by the alert flag.
    pub summary: String,
}

/// Projected effect of a traffic reduction on the current metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrafficProjection {
    /// AQI in the current snapshot.
    pub current_aqi: f64,
    /// AQI after the reduction, rounded to two decimals.
    pub projected_aqi: f64,
    /// Stress score recomputed with the projected AQI.
    pub projected_stress: f64,
    /// Relative AQI improvement in percent.
    pub improvement_percent: f64,
}
