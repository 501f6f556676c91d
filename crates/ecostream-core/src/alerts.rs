//! Threshold evaluation for the alert flag.
//!
//! The alert is raised when the AQI or the stress score is strictly above
//! its threshold. [`AlertThresholds::evaluate`] also reports which side
//! tripped so callers can pick a severity.

use ecostream_types::AlertSeverity;

use crate::config::AlertConfig;

/// Alert thresholds. Both comparisons are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// AQI strictly above this raises the alert.
    pub aqi: f64,
    /// Stress strictly above this raises the alert.
    pub stress: f64,
}

impl AlertThresholds {
    /// Reference thresholds: AQI 300, stress 70.
    pub const REFERENCE: Self = Self {
        aqi: 300.0,
        stress: 70.0,
    };

    /// Build thresholds from configuration.
    pub const fn from_config(config: &AlertConfig) -> Self {
        Self {
            aqi: config.aqi_threshold,
            stress: config.stress_threshold,
        }
    }

    /// Return `true` if either threshold is crossed.
    pub fn check(&self, aqi: f64, stress: f64) -> bool {
        self.evaluate(aqi, stress).is_some()
    }

    /// Return the severity of the crossing, or `None` if nothing tripped.
    ///
    /// An AQI crossing is [`AlertSeverity::Critical`]; a stress-only
    /// crossing is [`AlertSeverity::Warning`].
    pub fn evaluate(&self, aqi: f64, stress: f64) -> Option<AlertSeverity> {
        if aqi > self.aqi {
            Some(AlertSeverity::Critical)
        } else if stress > self.stress {
            Some(AlertSeverity::Warning)
        } else {
            None
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Evaluate the alert flag with the reference thresholds.
pub fn check_alert(aqi: f64, stress: f64) -> bool {
    AlertThresholds::REFERENCE.check(aqi, stress)
}
