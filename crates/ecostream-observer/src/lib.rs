//! Observer API server for the EcoStream monitor.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Read endpoint** (`GET /live-metrics`, alias `/api/snapshot`) serving
//!   the current [`Snapshot`] as JSON
//! - **Explanation endpoint** (`/api/explain`) answering keyword queries
//!   against the snapshot's news
//! - **What-if endpoint** (`GET /api/simulate`) projecting a traffic cut
//! - **Alert history** (`/api/alerts`) with acknowledgement
//! - **`WebSocket` endpoint** (`/ws/metrics`) pushing one
//!   [`CycleOutcome`] per completed cycle via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! Handlers read from the shared [`StateStore`] that the metrics and news
//! loops write to. Every read is an owned copy taken under the store's
//! lock, so a response never mixes two cycles.
//!
//! [`Snapshot`]: ecostream_types::Snapshot
//! [`CycleOutcome`]: ecostream_types::CycleOutcome
//! [`StateStore`]: ecostream_core::state::StateStore

pub mod alerts;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
