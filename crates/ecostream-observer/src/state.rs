//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the live [`StateStore`], the broadcast channel for
//! cycle outcomes, the alert history and the what-if simulator.

use std::sync::Arc;

use ecostream_core::simulator::PolicySimulator;
use ecostream_core::state::StateStore;
use ecostream_types::CycleOutcome;
use tokio::sync::{RwLock, broadcast};

use crate::alerts::AlertStore;

/// Capacity of the broadcast channel for cycle outcomes.
///
/// A subscriber that falls more than this many messages behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest one.
const BROADCAST_CAPACITY: usize = 256;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for cycle outcomes.
    pub tx: broadcast::Sender<CycleOutcome>,
    /// The live snapshot written by the metrics and news loops.
    pub store: Arc<StateStore>,
    /// Alert history, newest first.
    pub alert_store: Arc<RwLock<AlertStore>>,
    /// Traffic-reduction projection over the live snapshot.
    pub simulator: PolicySimulator,
}

impl AppState {
    /// Create application state over an existing store.
    pub fn new(store: Arc<StateStore>, simulator: PolicySimulator) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            store,
            alert_store: Arc::new(RwLock::new(AlertStore::new())),
            simulator,
        }
    }

    /// Subscribe to the cycle outcome channel.
    pub fn subscribe(&self) -> broadcast::Receiver<CycleOutcome> {
        self.tx.subscribe()
    }

    /// Publish a cycle outcome to all connected clients.
    ///
    /// Returns the number of receivers, which is 0 when nobody is
    /// connected.
    pub fn broadcast(&self, outcome: &CycleOutcome) -> usize {
        // send fails only when there are no receivers
        self.tx.send(outcome.clone()).unwrap_or(0)
    }
}
