//! One scoring cycle: read, score, alert, store.
//!
//! [`CycleOrchestrator::run_cycle`] pulls a reading from the injected
//! [`ReadingSource`], validates it, computes the stress score and alert
//! flag, and writes all four metrics to the [`StateStore`] in one update.
//! A reading that fails validation is rejected before anything is
//! written, so the store keeps the last good cycle.

use std::sync::Arc;

use ecostream_types::{CycleOutcome, Reading};
use tracing::debug;

use crate::alerts::AlertThresholds;
use crate::config::EcoConfig;
use crate::helpers::HelperError;
use crate::risk::{self, StressModel};
use crate::source::{ReadingSource, SourceError};
use crate::state::StateStore;

/// Errors that can occur during a single cycle.
///
/// Every variant leaves the snapshot untouched.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// The reading source failed.
    #[error("reading source error: {source}")]
    Source {
        /// The underlying source error.
        #[from]
        source: SourceError,
    },

    /// The reading is outside the scoring domain.
    #[error("invalid reading: {reason}")]
    InvalidReading {
        /// Explanation of what is wrong with the reading.
        reason: String,
    },
}

/// Check that a reading can be scored.
///
/// AQI and temperature must be finite and non-negative. Negative values
/// would pull the score below zero.
pub fn validate_reading(reading: &Reading) -> Result<(), CycleError> {
    if !reading.aqi.is_finite() || reading.aqi < 0.0 {
        return Err(CycleError::InvalidReading {
            reason: format!("aqi must be a non-negative number, got {}", reading.aqi),
        });
    }
    if !reading.temperature.is_finite() || reading.temperature < 0.0 {
        return Err(CycleError::InvalidReading {
            reason: format!(
                "temperature must be a non-negative number, got {}",
                reading.temperature
            ),
        });
    }
    Ok(())
}

/// Runs scoring cycles against a shared [`StateStore`].
#[derive(Debug, Clone)]
pub struct CycleOrchestrator {
    model: StressModel,
    thresholds: AlertThresholds,
    store: Arc<StateStore>,
}

impl CycleOrchestrator {
    /// Create an orchestrator from explicit parts.
    pub const fn new(model: StressModel, thresholds: AlertThresholds, store: Arc<StateStore>) -> Self {
        Self {
            model,
            thresholds,
            store,
        }
    }

    /// Create an orchestrator from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HelperError::InvalidCap`] if a normalization cap is invalid.
    pub fn from_config(config: &EcoConfig, store: Arc<StateStore>) -> Result<Self, HelperError> {
        Ok(Self::new(
            StressModel::new(&config.risk)?,
            AlertThresholds::from_config(&config.alerts),
            store,
        ))
    }

    /// Run one cycle and return what was written.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Source`] if the source fails and
    /// [`CycleError::InvalidReading`] if validation rejects the reading.
    /// The store is not modified in either case.
    pub async fn run_cycle(
        &self,
        source: &mut dyn ReadingSource,
    ) -> Result<CycleOutcome, CycleError> {
        let reading = source.next_reading()?;
        validate_reading(&reading)?;

        let stress = self.model.score(reading.aqi, reading.temperature);
        let alert = self.thresholds.check(reading.aqi, stress);

        let timestamp = self
            .store
            .update_metrics(reading.aqi, reading.temperature, stress, alert)
            .await;

        debug!(
            location = reading.location,
            aqi = reading.aqi,
            temperature = reading.temperature,
            stress,
            alert,
            "Cycle scored"
        );

        Ok(CycleOutcome {
            aqi: reading.aqi,
            temperature: reading.temperature,
            stress,
            alert,
            risk_level: risk::classify(stress),
            timestamp,
        })
    }

    /// The stress model used by this orchestrator.
    pub const fn model(&self) -> &StressModel {
        &self.model
    }

    /// The alert thresholds used by this orchestrator.
    pub const fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// The store this orchestrator writes to.
    pub const fn store(&self) -> &Arc<StateStore> {
        &self.store
    }
}
