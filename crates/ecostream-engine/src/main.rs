//! EcoStream monitor binary.
//!
//! Wires the scoring pipeline, the ingestion sources and the Observer API
//! together and runs them until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ecostream-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Validate configuration and log warnings
//! 4. Create the live state store and cycle orchestrator
//! 5. Build the reading and news sources
//! 6. Start the Observer API server
//! 7. Spawn the metrics and news loops
//! 8. Wait for `Ctrl-C`, then shut everything down

mod error;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ecostream_core::config::EcoConfig;
use ecostream_core::control::ShutdownSignal;
use ecostream_core::cycle::CycleOrchestrator;
use ecostream_core::risk::StressModel;
use ecostream_core::runner::{self, LoopBounds, LoopReport};
use ecostream_core::simulator::PolicySimulator;
use ecostream_core::state::StateStore;
use ecostream_ingest::{RssNewsSource, SimulatedReadingSource};
use ecostream_observer::server::ServerConfig;
use ecostream_observer::state::AppState;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "ecostream-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a source or the server
/// cannot be built, or a background task fails.
#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so report the source later.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("ecostream-engine starting");

    // 3. Validate configuration.
    let warnings = config.validate()?;
    for warning in &warnings {
        warn!(warning = warning.as_str(), "Configuration warning");
    }
    info!(
        path = CONFIG_PATH,
        from_file,
        location = config.location,
        metrics_interval_ms = config.schedule.metrics_interval_ms,
        news_interval_ms = config.schedule.news_interval_ms,
        news_enabled = config.news.enabled,
        "Configuration loaded"
    );

    // 4. Create the live state store and orchestrator.
    let store = Arc::new(StateStore::new(config.location.clone()));
    let orchestrator = CycleOrchestrator::from_config(&config, Arc::clone(&store))?;
    let simulator = PolicySimulator::new(
        config.policy.traffic_aqi_contribution,
        StressModel::new(&config.risk)?,
    );
    info!(
        aqi_weight = config.risk.aqi_weight,
        temp_weight = config.risk.temp_weight,
        aqi_threshold = config.alerts.aqi_threshold,
        stress_threshold = config.alerts.stress_threshold,
        "Stress model ready"
    );

    // 5. Build sources.
    let mut readings = SimulatedReadingSource::new(config.location.clone(), &config.sensors)?;
    let news = if config.news.enabled {
        let source = RssNewsSource::from_config(&config.news)?;
        info!(url = source.feed_url(), max_items = config.news.max_items, "News source ready");
        Some(source)
    } else {
        info!("News loop disabled");
        None
    };

    // 6. Start the Observer API server.
    let shutdown = Arc::new(ShutdownSignal::new());
    let app_state = Arc::new(AppState::new(Arc::clone(&store), simulator));
    let observer_handle = ecostream_observer::startup::spawn_observer(
        ServerConfig::from(&config.server),
        Arc::clone(&app_state),
        Arc::clone(&shutdown),
    )?;

    // 7. Spawn the loops.
    let mut callback = ObserverCallback::new(
        app_state,
        *orchestrator.thresholds(),
        config.location.clone(),
    );
    let metrics_bounds =
        LoopBounds::every(Duration::from_millis(config.schedule.metrics_interval_ms));
    let metrics_shutdown = Arc::clone(&shutdown);
    let metrics_handle = tokio::spawn(async move {
        runner::run_metrics_loop(
            &orchestrator,
            &mut readings,
            &metrics_shutdown,
            metrics_bounds,
            &mut callback,
        )
        .await
    });

    let news_handle: Option<JoinHandle<LoopReport>> = news.map(|source| {
        let news_bounds = LoopBounds::every(Duration::from_millis(config.schedule.news_interval_ms));
        let fetch_timeout = Duration::from_millis(config.news.fetch_timeout_ms);
        let news_store = Arc::clone(&store);
        let news_shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            runner::run_news_loop(&news_store, &source, &news_shutdown, news_bounds, fetch_timeout)
                .await
        })
    });

    // 8. Wait for Ctrl-C.
    let signal_shutdown = Arc::clone(&shutdown);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => warn!(error = %e, "Signal handler failed, shutting down"),
        }
        signal_shutdown.request();
    });

    let metrics_report = metrics_handle.await.map_err(|source| EngineError::Task {
        task: "metrics loop",
        source,
    })?;
    log_report("metrics", &metrics_report);

    if let Some(handle) = news_handle {
        let news_report = handle.await.map_err(|source| EngineError::Task {
            task: "news loop",
            source,
        })?;
        log_report("news", &news_report);
    }

    observer_handle.await.map_err(|source| EngineError::Task {
        task: "observer",
        source,
    })?;

    info!("ecostream-engine shutdown complete");
    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], falling back to defaults.
///
/// Returns the configuration and whether it came from the file.
/// Environment overrides apply in both cases.
fn load_config() -> Result<(EcoConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((EcoConfig::from_file(config_path)?, true))
    } else {
        let mut config = EcoConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

fn log_report(name: &str, report: &LoopReport) {
    info!(
        loop_name = name,
        end_reason = ?report.end_reason,
        succeeded = report.succeeded,
        failed = report.failed,
        "Loop finished"
    );
}
