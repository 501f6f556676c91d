//! Stress scoring, alerting, live state, and scheduling for EcoStream.
//!
//! This crate owns the pipeline that turns a sensor reading into the live
//! [`Snapshot`]: normalize, score, threshold, store. It also owns the two
//! repeating loops that drive it (metrics and news) and the read-side
//! features built on the snapshot (explanations and what-if projections).
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `ecostream-config.yaml` into
//!   strongly-typed structs, with startup validation.
//! - [`helpers`] -- Pure numeric utilities (normalize, percentage change).
//! - [`risk`] -- Weighted stress score and risk bands.
//! - [`alerts`] -- Threshold evaluation for the alert flag.
//! - [`state`] -- The synchronized live-state store.
//! - [`source`] -- Reading and news collaborator traits plus static stubs.
//! - [`cycle`] -- One scoring cycle: read, score, alert, store.
//! - [`control`] -- Cooperative shutdown signal shared by all loops.
//! - [`runner`] -- The metrics and news loops.
//! - [`explain`] -- Keyword-matched explanation of the current state.
//! - [`simulator`] -- Traffic-reduction what-if projection.
//!
//! [`Snapshot`]: ecostream_types::Snapshot

pub mod alerts;
pub mod config;
pub mod control;
pub mod cycle;
pub mod explain;
pub mod helpers;
pub mod risk;
pub mod runner;
pub mod simulator;
pub mod source;
pub mod state;
