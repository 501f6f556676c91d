//! Simulated sensor feed.
//!
//! Emits a uniformly random integer AQI and a uniformly random
//! temperature (rounded to two decimals) within the configured ranges.
//! A fixed seed makes the sequence reproducible.

use chrono::Utc;
use ecostream_core::config::SensorConfig;
use ecostream_core::helpers;
use ecostream_core::source::{ReadingSource, SourceError};
use ecostream_types::Reading;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::IngestError;

/// Random reading source for demos and load tests.
#[derive(Debug)]
pub struct SimulatedReadingSource {
    location: String,
    aqi_min: u32,
    aqi_max: u32,
    temperature_min: f64,
    temperature_max: f64,
    rng: StdRng,
}

impl SimulatedReadingSource {
    /// Create a source for `location` with the ranges in `config`.
    ///
    /// Uses `config.seed` when set, otherwise seeds from the OS.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidRange`] if a range is inverted or a
    /// temperature bound is not finite.
    pub fn new(location: impl Into<String>, config: &SensorConfig) -> Result<Self, IngestError> {
        if config.aqi_min > config.aqi_max {
            return Err(IngestError::InvalidRange {
                reason: format!("aqi {}..={}", config.aqi_min, config.aqi_max),
            });
        }
        if !config.temperature_min.is_finite()
            || !config.temperature_max.is_finite()
            || config.temperature_min > config.temperature_max
        {
            return Err(IngestError::InvalidRange {
                reason: format!(
                    "temperature {}..={}",
                    config.temperature_min, config.temperature_max
                ),
            });
        }

        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        Ok(Self {
            location: location.into(),
            aqi_min: config.aqi_min,
            aqi_max: config.aqi_max,
            temperature_min: config.temperature_min,
            temperature_max: config.temperature_max,
            rng,
        })
    }
}

impl ReadingSource for SimulatedReadingSource {
    fn next_reading(&mut self) -> Result<Reading, SourceError> {
        let aqi: u32 = self.rng.random_range(self.aqi_min..=self.aqi_max);
        let temperature = self
            .rng
            .random_range(self.temperature_min..=self.temperature_max);
        Ok(Reading {
            location: self.location.clone(),
            aqi: f64::from(aqi),
            temperature: helpers::round2(temperature),
            timestamp: Utc::now(),
        })
    }
}
