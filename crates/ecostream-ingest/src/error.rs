//! Error types for building the ingestion sources.

/// Errors that can occur while constructing a source.
///
/// Runtime failures (a fetch that fails, a feed that cannot be parsed)
/// are reported per call as [`SourceError`](ecostream_core::source::SourceError)
/// instead, so the loops can tolerate them.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// A sensor range is empty or not finite.
    #[error("invalid sensor range: {reason}")]
    InvalidRange {
        /// Explanation of what is wrong with the range.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {source}")]
    Http {
        /// The underlying reqwest error.
        #[from]
        source: reqwest::Error,
    },

    /// A feed extraction pattern failed to compile.
    #[error("feed pattern error: {source}")]
    Pattern {
        /// The underlying regex error.
        #[from]
        source: regex::Error,
    },
}
