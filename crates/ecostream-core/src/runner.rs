//! The metrics and news loops.
//!
//! This module provides the two repeating tasks that keep the snapshot
//! fresh:
//!
//! - [`run_metrics_loop`] runs one scoring cycle per tick.
//! - [`run_news_loop`] refreshes the news list per tick.
//!
//! Each loop is its own failure boundary. A failed cycle or fetch is
//! logged and counted, the snapshot keeps its last good value, and the
//! loop carries on at the next tick. Both loops observe the
//! [`ShutdownSignal`] at every sleep, and an optional tick limit lets
//! tests run a fixed number of iterations.

use std::time::Duration;

use ecostream_types::CycleOutcome;
use tracing::{debug, info, warn};

use crate::control::ShutdownSignal;
use crate::cycle::CycleOrchestrator;
use crate::source::{NewsSource, ReadingSource, SourceError};
use crate::state::StateStore;

/// Callback invoked after each successful cycle.
///
/// Implementations can use this to broadcast the outcome or raise alert
/// records. The snapshot has already been updated when this is called.
pub trait CycleCallback: Send {
    /// Called after a cycle completes successfully.
    fn on_cycle(&mut self, outcome: &CycleOutcome);
}

/// A no-op cycle callback.
pub struct NoOpCallback;

impl CycleCallback for NoOpCallback {
    fn on_cycle(&mut self, _outcome: &CycleOutcome) {}
}

/// Why a loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEndReason {
    /// The shutdown signal was raised.
    Shutdown,
    /// The configured number of ticks ran.
    TickLimitReached,
}

/// Pacing for a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopBounds {
    /// Pause between the end of one tick and the start of the next.
    pub interval: Duration,
    /// Stop after this many ticks; `None` runs until shutdown.
    pub max_ticks: Option<u64>,
}

impl LoopBounds {
    /// Run forever at `interval`.
    pub const fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }

    /// Stop after `ticks` iterations. A limit of zero returns before the
    /// first tick.
    pub const fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    fn limit_reached(&self, ticks: u64) -> bool {
        self.max_ticks.is_some_and(|max| ticks >= max)
    }
}

/// Summary of a finished loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopReport {
    /// Why the loop returned.
    pub end_reason: LoopEndReason,
    /// Ticks that updated the snapshot.
    pub succeeded: u64,
    /// Ticks that failed and left the snapshot untouched.
    pub failed: u64,
}

impl LoopReport {
    const fn new() -> Self {
        Self {
            end_reason: LoopEndReason::Shutdown,
            succeeded: 0,
            failed: 0,
        }
    }

    const fn ticks(&self) -> u64 {
        self.succeeded.saturating_add(self.failed)
    }

    const fn finish(mut self, reason: LoopEndReason) -> Self {
        self.end_reason = reason;
        self
    }
}

/// Run scoring cycles until shutdown or the tick limit.
///
/// Each tick calls [`CycleOrchestrator::run_cycle`]. On success the
/// outcome is logged and handed to `callback`. On failure the error is
/// logged at `warn` and the loop continues after the usual interval.
pub async fn run_metrics_loop(
    orchestrator: &CycleOrchestrator,
    source: &mut dyn ReadingSource,
    shutdown: &ShutdownSignal,
    bounds: LoopBounds,
    callback: &mut dyn CycleCallback,
) -> LoopReport {
    let mut report = LoopReport::new();

    info!(
        interval_ms = millis(bounds.interval),
        max_ticks = bounds.max_ticks,
        "Metrics loop starting"
    );

    loop {
        if shutdown.is_requested() {
            break;
        }
        if bounds.limit_reached(report.ticks()) {
            info!(ticks = report.ticks(), "Metrics loop tick limit reached");
            return report.finish(LoopEndReason::TickLimitReached);
        }

        match orchestrator.run_cycle(source).await {
            Ok(outcome) => {
                report.succeeded = report.succeeded.saturating_add(1);
                info!(
                    aqi = outcome.aqi,
                    temperature = outcome.temperature,
                    stress = outcome.stress,
                    alert = outcome.alert,
                    risk_level = ?outcome.risk_level,
                    "Metrics updated"
                );
                callback.on_cycle(&outcome);
            }
            Err(e) => {
                report.failed = report.failed.saturating_add(1);
                warn!(error = %e, "Metrics cycle skipped");
            }
        }

        // The last tick does not wait out the interval.
        if bounds.limit_reached(report.ticks()) {
            continue;
        }

        if !shutdown.sleep(bounds.interval).await {
            break;
        }
    }

    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "Metrics loop stopped"
    );
    report.finish(LoopEndReason::Shutdown)
}

/// Refresh the news list until shutdown or the tick limit.
///
/// Each fetch is bounded by `fetch_timeout`. A successful fetch replaces
/// the news list wholesale; a failed or timed-out fetch is logged and the
/// previous list stays in place.
pub async fn run_news_loop<N: NewsSource>(
    store: &StateStore,
    source: &N,
    shutdown: &ShutdownSignal,
    bounds: LoopBounds,
    fetch_timeout: Duration,
) -> LoopReport {
    let mut report = LoopReport::new();

    info!(
        interval_ms = millis(bounds.interval),
        timeout_ms = millis(fetch_timeout),
        "News loop starting"
    );

    loop {
        if shutdown.is_requested() {
            break;
        }
        if bounds.limit_reached(report.ticks()) {
            debug!(ticks = report.ticks(), "News loop tick limit reached");
            return report.finish(LoopEndReason::TickLimitReached);
        }

        match fetch_with_timeout(source, fetch_timeout).await {
            Ok(items) => {
                report.succeeded = report.succeeded.saturating_add(1);
                let count = items.len();
                store.update_news(items).await;
                info!(count, "News updated");
            }
            Err(e) => {
                report.failed = report.failed.saturating_add(1);
                warn!(error = %e, "News refresh failed, keeping previous items");
            }
        }

        // The last tick does not wait out the interval.
        if bounds.limit_reached(report.ticks()) {
            continue;
        }

        if !shutdown.sleep(bounds.interval).await {
            break;
        }
    }

    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "News loop stopped"
    );
    report.finish(LoopEndReason::Shutdown)
}

async fn fetch_with_timeout<N: NewsSource>(
    source: &N,
    timeout: Duration,
) -> Result<Vec<ecostream_types::NewsItem>, SourceError> {
    tokio::time::timeout(timeout, source.fetch_news())
        .await
        .map_err(|_elapsed| SourceError::Timeout {
            timeout_ms: millis(timeout),
        })?
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::Utc;
    use ecostream_types::NewsItem;

    use super::*;
    use crate::alerts::AlertThresholds;
    use crate::risk::StressModel;
    use crate::source::{ScriptedReadingSource, StaticNewsSource, StaticReadingSource};

    fn orchestrator() -> CycleOrchestrator {
        CycleOrchestrator::new(
            StressModel::default(),
            AlertThresholds::default(),
            Arc::new(StateStore::new("Noida")),
        )
    }

    fn headline(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_owned(),
            link: None,
            summary: None,
            published: Utc::now(),
        }
    }

    /// Fails on every odd call, succeeds on every even call.
    struct FlakyNews {
        calls: AtomicU32,
    }

    impl NewsSource for FlakyNews {
        async fn fetch_news(&self) -> Result<Vec<NewsItem>, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 1 {
                Err(SourceError::Fetch {
                    message: String::from("feed unreachable"),
                })
            } else {
                Ok(vec![headline(&format!("batch {n}"))])
            }
        }
    }

    /// Never answers.
    struct HangingNews;

    impl NewsSource for HangingNews {
        async fn fetch_news(&self) -> Result<Vec<NewsItem>, SourceError> {
            std::future::pending::<()>().await;
            Ok(Vec::new())
        }
    }

    struct CountCallback {
        count: u64,
        alerts: u64,
    }

    impl CycleCallback for CountCallback {
        fn on_cycle(&mut self, outcome: &CycleOutcome) {
            self.count = self.count.saturating_add(1);
            if outcome.alert {
                self.alerts = self.alerts.saturating_add(1);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn metrics_loop_runs_bounded_ticks() {
        let orch = orchestrator();
        let mut source = StaticReadingSource::new("Noida", 350.0, 40.0);
        let shutdown = ShutdownSignal::new();
        let mut cb = CountCallback { count: 0, alerts: 0 };

        let report = run_metrics_loop(
            &orch,
            &mut source,
            &shutdown,
            LoopBounds::every(Duration::from_secs(3)).with_max_ticks(4),
            &mut cb,
        )
        .await;

        assert_eq!(report.end_reason, LoopEndReason::TickLimitReached);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failed, 0);
        assert_eq!(cb.count, 4);
        assert_eq!(cb.alerts, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn metrics_loop_survives_failed_cycles() {
        let orch = orchestrator();
        let mut source = ScriptedReadingSource::new([
            Ok((120.0, 25.0)),
            Err(SourceError::Fetch {
                message: String::from("sensor offline"),
            }),
            Ok((-1.0, 25.0)),
            Ok((350.0, 40.0)),
        ]);
        let shutdown = ShutdownSignal::new();
        let mut cb = CountCallback { count: 0, alerts: 0 };

        let report = run_metrics_loop(
            &orch,
            &mut source,
            &shutdown,
            LoopBounds::every(Duration::from_secs(3)).with_max_ticks(4),
            &mut cb,
        )
        .await;

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(cb.count, 2);
        let snap = orch.store().get_state().await;
        assert!((snap.aqi - 350.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn zero_tick_limit_runs_nothing() {
        let orch = orchestrator();
        let mut source = StaticReadingSource::new("Noida", 350.0, 40.0);
        let shutdown = ShutdownSignal::new();
        let mut cb = CountCallback { count: 0, alerts: 0 };
        let bounds = LoopBounds::every(Duration::from_secs(3)).with_max_ticks(0);

        let report = run_metrics_loop(&orch, &mut source, &shutdown, bounds, &mut cb).await;
        assert_eq!(report.end_reason, LoopEndReason::TickLimitReached);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 0);
        assert_eq!(cb.count, 0);
        assert!(orch.store().get_state().await.timestamp.is_none());

        let store = StateStore::new("Noida");
        let news = StaticNewsSource::new(vec![headline("Delhi smog")]);
        let report = run_news_loop(&store, &news, &shutdown, bounds, Duration::from_secs(10)).await;
        assert_eq!(report.end_reason, LoopEndReason::TickLimitReached);
        assert_eq!(report.ticks(), 0);
        assert!(store.get_state().await.news.is_empty());
    }

    #[tokio::test]
    async fn metrics_loop_stops_on_shutdown() {
        let orch = orchestrator();
        let mut source = StaticReadingSource::new("Noida", 100.0, 20.0);
        let shutdown = ShutdownSignal::new();
        shutdown.request();

        let report = run_metrics_loop(
            &orch,
            &mut source,
            &shutdown,
            LoopBounds::every(Duration::from_secs(3)),
            &mut NoOpCallback,
        )
        .await;

        assert_eq!(report.end_reason, LoopEndReason::Shutdown);
        assert_eq!(report.succeeded, 0);
    }

    #[tokio::test]
    async fn metrics_loop_wakes_for_shutdown_mid_sleep() {
        let orch = orchestrator();
        let shutdown = Arc::new(ShutdownSignal::new());

        let handle = {
            let shutdown = Arc::clone(&shutdown);
            let orch = orch.clone();
            tokio::spawn(async move {
                let mut source = StaticReadingSource::new("Noida", 100.0, 20.0);
                run_metrics_loop(
                    &orch,
                    &mut source,
                    &shutdown,
                    LoopBounds::every(Duration::from_secs(3_600)),
                    &mut NoOpCallback,
                )
                .await
            })
        };

        // Wait for the first cycle to land, then stop the loop while it sleeps.
        while orch.store().get_state().await.timestamp.is_none() {
            tokio::task::yield_now().await;
        }
        shutdown.request();

        let report = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.end_reason, LoopEndReason::Shutdown);
        assert_eq!(report.succeeded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn news_loop_replaces_items() {
        let store = StateStore::new("Noida");
        let source = StaticNewsSource::new(vec![headline("Delhi smog"), headline("Noida AQI")]);
        let shutdown = ShutdownSignal::new();

        let report = run_news_loop(
            &store,
            &source,
            &shutdown,
            LoopBounds::every(Duration::from_secs(30)).with_max_ticks(2),
            Duration::from_secs(10),
        )
        .await;

        assert_eq!(report.succeeded, 2);
        assert_eq!(store.get_state().await.news.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn news_loop_keeps_previous_items_on_failure() {
        let store = StateStore::new("Noida");
        let source = FlakyNews {
            calls: AtomicU32::new(0),
        };
        let shutdown = ShutdownSignal::new();

        let report = run_news_loop(
            &store,
            &source,
            &shutdown,
            LoopBounds::every(Duration::from_secs(30)).with_max_ticks(2),
            Duration::from_secs(10),
        )
        .await;

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        let news = store.get_state().await.news;
        assert_eq!(news.first().map(|n| n.title.as_str()), Some("batch 0"));
    }

    #[tokio::test(start_paused = true)]
    async fn news_loop_times_out_hanging_fetch() {
        let store = StateStore::new("Noida");
        let shutdown = ShutdownSignal::new();

        let report = run_news_loop(
            &store,
            &HangingNews,
            &shutdown,
            LoopBounds::every(Duration::from_secs(30)).with_max_ticks(1),
            Duration::from_secs(10),
        )
        .await;

        assert_eq!(report.failed, 1);
        assert!(store.get_state().await.news.is_empty());
    }
}
