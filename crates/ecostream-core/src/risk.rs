//! Weighted stress score.
//!
//! The stress score combines the normalized AQI and the normalized
//! temperature:
//!
//! ```text
//! stress = round2(100 * (aqi_weight * min(aqi / aqi_cap, 1)
//!                      + temp_weight * min(temperature / temperature_cap, 1)))
//! ```
//!
//! With the reference weights (0.6 and 0.3) the score tops out at 90.
//! The weights are kept as configured and not rescaled to sum to 1.

use ecostream_types::RiskLevel;

use crate::config::RiskConfig;
use crate::helpers::{self, HelperError};

/// Validated stress scoring parameters.
///
/// Construction checks both normalization caps, so [`StressModel::score`]
/// is infallible afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StressModel {
    aqi_weight: f64,
    temp_weight: f64,
    aqi_cap: f64,
    temperature_cap: f64,
}

impl StressModel {
    /// Build a model from the risk configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HelperError::InvalidCap`] if either cap is not a positive
    /// finite number.
    pub fn new(config: &RiskConfig) -> Result<Self, HelperError> {
        // Probe both caps once; `normalize` is the single place that
        // defines what a valid cap is.
        helpers::normalize(0.0, config.aqi_cap)?;
        helpers::normalize(0.0, config.temperature_cap)?;
        Ok(Self {
            aqi_weight: config.aqi_weight,
            temp_weight: config.temp_weight,
            aqi_cap: config.aqi_cap,
            temperature_cap: config.temperature_cap,
        })
    }

    /// Compute the stress score for one reading, rounded to 2 decimals.
    pub fn score(&self, aqi: f64, temperature: f64) -> f64 {
        let norm_aqi = capped_ratio(aqi, self.aqi_cap);
        let norm_temp = capped_ratio(temperature, self.temperature_cap);
        helpers::round2(100.0 * (self.aqi_weight * norm_aqi + self.temp_weight * norm_temp))
    }

    /// Highest score this model can produce.
    pub fn max_score(&self) -> f64 {
        helpers::round2(100.0 * (self.aqi_weight + self.temp_weight))
    }
}

impl Default for StressModel {
    fn default() -> Self {
        let config = RiskConfig::default();
        Self {
            aqi_weight: config.aqi_weight,
            temp_weight: config.temp_weight,
            aqi_cap: config.aqi_cap,
            temperature_cap: config.temperature_cap,
        }
    }
}

/// `min(value / cap, 1)` for a cap already checked by the constructor.
fn capped_ratio(value: f64, cap: f64) -> f64 {
    helpers::normalize(value, cap).unwrap_or(0.0)
}

/// Compute the stress score with the reference weights and caps.
pub fn compute_stress(aqi: f64, temperature: f64) -> f64 {
    StressModel::default().score(aqi, temperature)
}

/// Map a stress score onto its qualitative band.
///
/// Bands: above 75 is [`RiskLevel::Severe`], above 50 [`RiskLevel::High`],
/// above 30 [`RiskLevel::Moderate`], otherwise [`RiskLevel::Low`].
pub fn classify(stress: f64) -> RiskLevel {
    if stress > 75.0 {
        RiskLevel::Severe
    } else if stress > 50.0 {
        RiskLevel::High
    } else if stress > 30.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}
