//! Cycle callback that feeds the Observer API.
//!
//! After each cycle this callback pushes the outcome to `WebSocket`
//! subscribers and records an alert whenever the alert flag goes from
//! clear to raised.

use std::sync::Arc;

use ecostream_core::alerts::AlertThresholds;
use ecostream_core::runner::CycleCallback;
use ecostream_observer::state::AppState;
use ecostream_types::{AlertSeverity, CycleOutcome};
use tracing::{debug, warn};

/// An alert waiting for the alert store lock.
#[derive(Debug, Clone, PartialEq)]
struct PendingAlert {
    severity: AlertSeverity,
    message: String,
    aqi: f64,
    stress: f64,
}

/// Callback that bridges the metrics loop to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
    thresholds: AlertThresholds,
    location: String,
    alert_active: bool,
    pending: Vec<PendingAlert>,
}

impl ObserverCallback {
    /// Create a callback backed by the given app state.
    pub fn new(state: Arc<AppState>, thresholds: AlertThresholds, location: impl Into<String>) -> Self {
        Self {
            state,
            thresholds,
            location: location.into(),
            alert_active: false,
            pending: Vec::new(),
        }
    }

    fn message_for(&self, severity: AlertSeverity, outcome: &CycleOutcome) -> String {
        match severity {
            AlertSeverity::Critical => format!(
                "AQI {} in {} exceeded the alert threshold of {}",
                outcome.aqi, self.location, self.thresholds.aqi
            ),
            AlertSeverity::Warning => format!(
                "Stress score {} in {} exceeded the alert threshold of {}",
                outcome.stress, self.location, self.thresholds.stress
            ),
        }
    }

    /// Move pending alerts into the store if the lock is free.
    ///
    /// Uses `try_write` so the metrics loop never waits on an API reader;
    /// anything left over is retried on the next cycle.
    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        match self.state.alert_store.try_write() {
            Ok(mut store) => {
                for alert in self.pending.drain(..) {
                    let id = store.raise(alert.severity, alert.message, alert.aqi, alert.stress);
                    warn!(%id, severity = ?alert.severity, "Alert raised");
                }
            }
            Err(_) => debug!(pending = self.pending.len(), "Alert store busy, deferring"),
        }
    }
}

impl CycleCallback for ObserverCallback {
    fn on_cycle(&mut self, outcome: &CycleOutcome) {
        let receivers = self.state.broadcast(outcome);
        debug!(receivers, "Cycle outcome broadcast");

        let rising_edge = outcome.alert && !self.alert_active;
        self.alert_active = outcome.alert;

        if rising_edge
            && let Some(severity) = self.thresholds.evaluate(outcome.aqi, outcome.stress)
        {
            self.pending.push(PendingAlert {
                severity,
                message: self.message_for(severity, outcome),
                aqi: outcome.aqi,
                stress: outcome.stress,
            });
        }

        self.flush_pending();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use ecostream_core::risk;
    use ecostream_core::simulator::PolicySimulator;
    use ecostream_core::state::StateStore;

    use super::*;

    fn outcome(aqi: f64, stress: f64) -> CycleOutcome {
        let alert = AlertThresholds::REFERENCE.check(aqi, stress);
        CycleOutcome {
            aqi,
            temperature: 40.0,
            stress,
            alert,
            risk_level: risk::classify(stress),
            timestamp: Utc::now(),
        }
    }

    fn callback() -> (ObserverCallback, Arc<AppState>) {
        let state = Arc::new(AppState::new(
            Arc::new(StateStore::new("Noida")),
            PolicySimulator::default(),
        ));
        let cb = ObserverCallback::new(Arc::clone(&state), AlertThresholds::REFERENCE, "Noida");
        (cb, state)
    }

    #[tokio::test]
    async fn raises_once_per_rising_edge() {
        let (mut cb, state) = callback();
        cb.on_cycle(&outcome(100.0, 20.0));
        cb.on_cycle(&outcome(350.0, 66.0));
        cb.on_cycle(&outcome(360.0, 67.0));
        cb.on_cycle(&outcome(100.0, 20.0));
        cb.on_cycle(&outcome(250.0, 72.0));

        let store = state.alert_store.read().await;
        let alerts = store.all();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts.first().map(|a| a.severity), Some(AlertSeverity::Warning));
        assert_eq!(alerts.last().map(|a| a.severity), Some(AlertSeverity::Critical));
        assert!(alerts.last().unwrap().message.contains("AQI 350"));
    }

    #[tokio::test]
    async fn busy_store_defers_alert() {
        let (mut cb, state) = callback();
        {
            let _reader = state.alert_store.read().await;
            cb.on_cycle(&outcome(350.0, 66.0));
        }
        assert!(state.alert_store.read().await.all().is_empty());

        cb.on_cycle(&outcome(355.0, 66.0));
        assert_eq!(state.alert_store.read().await.all().len(), 1);
    }

    #[tokio::test]
    async fn broadcasts_every_cycle() {
        let (mut cb, state) = callback();
        let mut rx = state.subscribe();
        cb.on_cycle(&outcome(100.0, 20.0));
        cb.on_cycle(&outcome(120.0, 22.0));
        assert!((rx.recv().await.unwrap().aqi - 100.0).abs() < f64::EPSILON);
        assert!((rx.recv().await.unwrap().aqi - 120.0).abs() < f64::EPSILON);
    }
}
