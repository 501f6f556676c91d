//! Traffic-reduction what-if projection.
//!
//! Assumes a fixed share of the AQI comes from road traffic. Cutting
//! traffic by `p` percent removes `share * p / 100` of the current AQI;
//! the stress score is then recomputed with the current temperature.

use ecostream_types::{Snapshot, TrafficProjection};

use crate::helpers;
use crate::risk::StressModel;

/// Errors raised by the policy simulator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// The requested reduction is not a percentage in `[0, 100]`.
    #[error("reduction must be within [0, 100] percent, got {percent}")]
    InvalidReduction {
        /// The rejected value.
        percent: f64,
    },
}

/// Projects the effect of traffic reductions on the live snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySimulator {
    traffic_aqi_contribution: f64,
    model: StressModel,
}

impl PolicySimulator {
    /// Create a simulator.
    ///
    /// `traffic_aqi_contribution` is the share of AQI attributed to
    /// traffic; configuration validation keeps it within `[0, 1]`.
    pub const fn new(traffic_aqi_contribution: f64, model: StressModel) -> Self {
        Self {
            traffic_aqi_contribution,
            model,
        }
    }

    /// Project the snapshot's metrics after a `reduction_percent` traffic cut.
    pub fn simulate_traffic_reduction(
        &self,
        snapshot: &Snapshot,
        reduction_percent: f64,
    ) -> Result<TrafficProjection, SimulationError> {
        if !reduction_percent.is_finite() || !(0.0..=100.0).contains(&reduction_percent) {
            return Err(SimulationError::InvalidReduction {
                percent: reduction_percent,
            });
        }

        let current_aqi = snapshot.aqi;
        let reduction_factor = self.traffic_aqi_contribution * (reduction_percent / 100.0);
        let projected_aqi = current_aqi - current_aqi * reduction_factor;

        Ok(TrafficProjection {
            current_aqi,
            projected_aqi: helpers::round2(projected_aqi),
            projected_stress: self.model.score(projected_aqi, snapshot.temperature),
            improvement_percent: helpers::percentage_change(current_aqi, projected_aqi),
        })
    }
}

impl Default for PolicySimulator {
    fn default() -> Self {
        Self::new(0.4, StressModel::default())
    }
}
