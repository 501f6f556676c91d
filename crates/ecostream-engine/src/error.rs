//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and shutdown so
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ecostream_core::config::ConfigError,
    },

    /// The stress model rejected its parameters.
    #[error("risk model error: {source}")]
    Model {
        /// The underlying helper error.
        #[from]
        source: ecostream_core::helpers::HelperError,
    },

    /// A reading or news source could not be built.
    #[error("ingest error: {source}")]
    Ingest {
        /// The underlying ingest error.
        #[from]
        source: ecostream_ingest::IngestError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: ecostream_observer::startup::StartupError,
    },

    /// A background task panicked or was cancelled.
    #[error("task {task} failed: {source}")]
    Task {
        /// Name of the task.
        task: &'static str,
        /// The underlying join error.
        source: tokio::task::JoinError,
    },
}
