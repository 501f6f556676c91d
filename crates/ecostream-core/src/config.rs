//! Configuration loading and typed config structures for EcoStream.
//!
//! The canonical configuration lives in `ecostream-config.yaml` in the
//! working directory. This module defines strongly-typed structs that
//! mirror the YAML structure, a loader, and [`EcoConfig::validate`],
//! which rejects values that would make the scorer misbehave. Validation
//! runs once at startup so a bad cap or weight is fatal there instead of
//! surfacing on the first cycle.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level EcoStream configuration.
///
/// Mirrors the structure of `ecostream-config.yaml`. Every field has a
/// default matching the reference deployment, so an empty file (or no
/// file at all) yields a working configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EcoConfig {
    /// Name of the monitored location.
    #[serde(default = "default_location")]
    pub location: String,

    /// Stress score weights and normalization caps.
    #[serde(default)]
    pub risk: RiskConfig,

    /// Alert thresholds.
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Simulated sensor ranges.
    #[serde(default)]
    pub sensors: SensorConfig,

    /// What-if policy parameters.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Loop intervals.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// News feed settings.
    #[serde(default)]
    pub news: NewsConfig,

    /// Observer HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EcoConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            risk: RiskConfig::default(),
            alerts: AlertConfig::default(),
            sensors: SensorConfig::default(),
            policy: PolicyConfig::default(),
            schedule: ScheduleConfig::default(),
            news: NewsConfig::default(),
            server: ServerSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EcoConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ECOSTREAM_LOCATION` overrides `location`
    /// - `NEWS_FEED_URL` overrides `news.feed_url`
    /// - `OBSERVER_PORT` overrides `server.port` (ignored if not a port number)
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying env overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override selected fields with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ECOSTREAM_LOCATION") {
            self.location = val;
        }
        if let Ok(val) = std::env::var("NEWS_FEED_URL") {
            self.news.feed_url = val;
        }
        if let Ok(val) = std::env::var("OBSERVER_PORT")
            && let Ok(port) = val.parse::<u16>()
        {
            self.server.port = port;
        }
    }

    /// Check every value the pipeline depends on.
    ///
    /// Returns a list of non-fatal warnings on success. Fatal problems
    /// (non-positive caps, weights that could push the score above 100,
    /// zero intervals, inverted sensor ranges) are returned as
    /// [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<Vec<String>, ConfigError> {
        let mut warnings = Vec::new();

        if self.location.trim().is_empty() {
            return Err(invalid("location must not be empty"));
        }

        // Risk weights and caps.
        let risk = &self.risk;
        require_positive("risk.aqi_cap", risk.aqi_cap)?;
        require_positive("risk.temperature_cap", risk.temperature_cap)?;
        require_non_negative("risk.aqi_weight", risk.aqi_weight)?;
        require_non_negative("risk.temp_weight", risk.temp_weight)?;
        let weight_sum = risk.aqi_weight + risk.temp_weight;
        if weight_sum > 1.0 + WEIGHT_TOLERANCE {
            return Err(invalid(format!(
                "risk weights sum to {weight_sum}, which lets the stress score exceed 100"
            )));
        }
        if (weight_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            warnings.push(format!(
                "risk weights sum to {weight_sum:.2}, not 1.0; the stress score tops out at {:.1}",
                weight_sum * 100.0
            ));
        }

        // Alert thresholds.
        require_non_negative("alerts.aqi_threshold", self.alerts.aqi_threshold)?;
        require_non_negative("alerts.stress_threshold", self.alerts.stress_threshold)?;
        if self.alerts.stress_threshold >= weight_sum * 100.0 {
            warnings.push(format!(
                "alerts.stress_threshold {} is unreachable with the configured weights",
                self.alerts.stress_threshold
            ));
        }

        // Sensor ranges.
        let sensors = &self.sensors;
        if sensors.aqi_min > sensors.aqi_max {
            return Err(invalid(format!(
                "sensors.aqi_min {} exceeds sensors.aqi_max {}",
                sensors.aqi_min, sensors.aqi_max
            )));
        }
        require_non_negative("sensors.temperature_min", sensors.temperature_min)?;
        require_non_negative("sensors.temperature_max", sensors.temperature_max)?;
        if sensors.temperature_min > sensors.temperature_max {
            return Err(invalid(format!(
                "sensors.temperature_min {} exceeds sensors.temperature_max {}",
                sensors.temperature_min, sensors.temperature_max
            )));
        }

        // Policy.
        let contribution = self.policy.traffic_aqi_contribution;
        if !contribution.is_finite() || !(0.0..=1.0).contains(&contribution) {
            return Err(invalid(format!(
                "policy.traffic_aqi_contribution must be within [0, 1], got {contribution}"
            )));
        }

        // Schedule and news.
        if self.schedule.metrics_interval_ms == 0 {
            return Err(invalid("schedule.metrics_interval_ms must be at least 1"));
        }
        if self.schedule.news_interval_ms == 0 {
            return Err(invalid("schedule.news_interval_ms must be at least 1"));
        }
        if self.news.fetch_timeout_ms == 0 {
            return Err(invalid("news.fetch_timeout_ms must be at least 1"));
        }
        if self.news.max_items == 0 {
            return Err(invalid("news.max_items must be at least 1"));
        }
        if self.news.enabled && self.news.feed_url.trim().is_empty() {
            return Err(invalid("news.feed_url must be set when news is enabled"));
        }

        Ok(warnings)
    }
}

/// Slack allowed when comparing the weight sum against 1.
const WEIGHT_TOLERANCE: f64 = 1e-9;

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!(
            "{name} must be a non-negative finite number, got {value}"
        )))
    }
}

/// Stress score weights and normalization caps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RiskConfig {
    /// Weight of the normalized AQI in the stress score.
    #[serde(default = "default_aqi_weight")]
    pub aqi_weight: f64,

    /// Weight of the normalized temperature in the stress score.
    #[serde(default = "default_temp_weight")]
    pub temp_weight: f64,

    /// AQI value that normalizes to 1.
    #[serde(default = "default_aqi_cap")]
    pub aqi_cap: f64,

    /// Temperature value (Celsius) that normalizes to 1.
    #[serde(default = "default_temperature_cap")]
    pub temperature_cap: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            aqi_weight: default_aqi_weight(),
            temp_weight: default_temp_weight(),
            aqi_cap: default_aqi_cap(),
            temperature_cap: default_temperature_cap(),
        }
    }
}

/// Alert thresholds. Both bounds are exclusive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertConfig {
    /// AQI strictly above this raises the alert.
    #[serde(default = "default_aqi_threshold")]
    pub aqi_threshold: f64,

    /// Stress strictly above this raises the alert.
    #[serde(default = "default_stress_threshold")]
    pub stress_threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            aqi_threshold: default_aqi_threshold(),
            stress_threshold: default_stress_threshold(),
        }
    }
}

/// Ranges for the simulated sensor feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorConfig {
    /// Lowest AQI the simulator emits (inclusive).
    #[serde(default = "default_aqi_min")]
    pub aqi_min: u32,

    /// Highest AQI the simulator emits (inclusive).
    #[serde(default = "default_aqi_max")]
    pub aqi_max: u32,

    /// Lowest temperature the simulator emits.
    #[serde(default = "default_temperature_min")]
    pub temperature_min: f64,

    /// Highest temperature the simulator emits.
    #[serde(default = "default_temperature_max")]
    pub temperature_max: f64,

    /// Optional RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            aqi_min: default_aqi_min(),
            aqi_max: default_aqi_max(),
            temperature_min: default_temperature_min(),
            temperature_max: default_temperature_max(),
            seed: None,
        }
    }
}

/// What-if policy parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PolicyConfig {
    /// Share of the AQI attributed to road traffic, in `[0, 1]`.
    #[serde(default = "default_traffic_aqi_contribution")]
    pub traffic_aqi_contribution: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            traffic_aqi_contribution: default_traffic_aqi_contribution(),
        }
    }
}

/// Loop intervals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Milliseconds between metrics cycles.
    #[serde(default = "default_metrics_interval_ms")]
    pub metrics_interval_ms: u64,

    /// Milliseconds between news refreshes.
    #[serde(default = "default_news_interval_ms")]
    pub news_interval_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            metrics_interval_ms: default_metrics_interval_ms(),
            news_interval_ms: default_news_interval_ms(),
        }
    }
}

/// News feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewsConfig {
    /// Whether the news loop runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// RSS feed URL.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Maximum number of items kept from each fetch.
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Deadline for a single fetch, in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            feed_url: default_feed_url(),
            max_items: default_max_items(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

/// Observer HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_location() -> String {
    "Noida".to_owned()
}

const fn default_aqi_weight() -> f64 {
    0.6
}

const fn default_temp_weight() -> f64 {
    0.3
}

const fn default_aqi_cap() -> f64 {
    500.0
}

const fn default_temperature_cap() -> f64 {
    50.0
}

const fn default_aqi_threshold() -> f64 {
    300.0
}

const fn default_stress_threshold() -> f64 {
    70.0
}

const fn default_aqi_min() -> u32 {
    80
}

const fn default_aqi_max() -> u32 {
    400
}

const fn default_temperature_min() -> f64 {
    20.0
}

const fn default_temperature_max() -> f64 {
    45.0
}

const fn default_traffic_aqi_contribution() -> f64 {
    0.4
}

const fn default_metrics_interval_ms() -> u64 {
    3_000
}

const fn default_news_interval_ms() -> u64 {
    30_000
}

const fn default_true() -> bool {
    true
}

fn default_feed_url() -> String {
    "https://news.google.com/rss/search?q=air+pollution+india".to_owned()
}

const fn default_max_items() -> usize {
    5
}

const fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_owned()
}
