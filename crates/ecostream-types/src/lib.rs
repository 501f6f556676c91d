//! Shared type definitions for the EcoStream environmental monitor.
//!
//! This crate is the single source of truth for the records that flow
//! between the scoring pipeline, the ingestion collaborators, and the
//! observer API. Types are exported to `TypeScript` via `ts-rs` for the
//! dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Risk bands and alert severities
//! - [`structs`] -- Readings, news items, the live snapshot, and derived
//!   projections served by the API

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AlertSeverity, RiskLevel};
pub use ids::AlertId;
pub use structs::{
    CycleOutcome, Explanation, NewsItem, Reading, Snapshot, TrafficProjection,
};

#[cfg(test)]
mod tests {
    //! Export checks for `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Importing the types here triggers generation into `bindings/`
        // relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::AlertId::export_all();
        let _ = crate::enums::RiskLevel::export_all();
        let _ = crate::enums::AlertSeverity::export_all();
        let _ = crate::structs::NewsItem::export_all();
        let _ = crate::structs::Snapshot::export_all();
        let _ = crate::structs::CycleOutcome::export_all();
        let _ = crate::structs::Explanation::export_all();
        let _ = crate::structs::TrafficProjection::export_all();
    }
}
