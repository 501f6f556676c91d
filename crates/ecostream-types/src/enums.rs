//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Qualitative band derived from the stress score.
///
/// The bands are ordered so that `Low < Moderate < High < Severe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RiskLevel {
    /// Stress at or below 30.
    Low,
    /// Stress above 30 and at or below 50.
    Moderate,
    /// Stress above 50 and at or below 75.
    High,
    /// Stress above 75.
    Severe,
}

/// Severity of a raised alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Only the stress threshold was crossed.
    Warning,
    /// The AQI threshold was crossed.
    Critical,
}
