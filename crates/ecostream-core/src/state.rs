//! The live-state store.
//!
//! [`StateStore`] owns the single [`Snapshot`] of the process behind a
//! [`RwLock`]. Writers take the write lock once per update, so a reader
//! always sees every metric field from the same cycle. Readers receive an
//! owned copy; later updates never show through a previously returned
//! snapshot.

use chrono::{DateTime, Utc};
use ecostream_types::{NewsItem, Snapshot};
use tokio::sync::RwLock;

/// Synchronized owner of the live [`Snapshot`].
///
/// Shared between the loops and the observer API via `Arc<StateStore>`.
#[derive(Debug)]
pub struct StateStore {
    snapshot: RwLock<Snapshot>,
}

impl StateStore {
    /// Create a store holding the start-of-process snapshot for `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::empty(location)),
        }
    }

    /// Overwrite the metric fields and stamp them with the current time.
    ///
    /// The time is read under the write lock, so snapshot timestamps never
    /// go backwards. Returns the timestamp that was written.
    pub async fn update_metrics(
        &self,
        aqi: f64,
        temperature: f64,
        stress: f64,
        alert: bool,
    ) -> DateTime<Utc> {
        let mut snap = self.snapshot.write().await;
        let now = Utc::now();
        snap.aqi = aqi;
        snap.temperature = temperature;
        snap.stress = stress;
        snap.alert = alert;
        snap.timestamp = Some(now);
        now
    }

    /// Replace the news list wholesale.
    pub async fn update_news(&self, items: Vec<NewsItem>) {
        let mut snap = self.snapshot.write().await;
        snap.news = items;
    }

    /// Return a copy of the current snapshot.
    pub async fn get_state(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }
}
