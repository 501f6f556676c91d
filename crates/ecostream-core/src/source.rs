//! Reading and news collaborator traits.
//!
//! The cycle orchestrator pulls one [`Reading`] per tick from a
//! [`ReadingSource`]; the news loop pulls a batch of [`NewsItem`]s from a
//! [`NewsSource`]. Production implementations (simulated sensors, RSS)
//! live in `ecostream-ingest`. The static sources here serve tests and
//! offline runs.

use std::collections::VecDeque;
use std::future::Future;

use chrono::Utc;
use ecostream_types::{NewsItem, Reading};

/// Errors reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The upstream could not be reached or returned an error status.
    #[error("fetch failed: {message}")]
    Fetch {
        /// Description of the failure.
        message: String,
    },

    /// The upstream answered with content that could not be parsed.
    #[error("parse failed: {message}")]
    Parse {
        /// Description of the failure.
        message: String,
    },

    /// The fetch did not complete before its deadline.
    #[error("fetch timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline in milliseconds.
        timeout_ms: u64,
    },

    /// A scripted source has no more readings.
    #[error("source exhausted")]
    Exhausted,
}

/// A source of sensor readings.
pub trait ReadingSource: Send {
    /// Produce the next reading.
    fn next_reading(&mut self) -> Result<Reading, SourceError>;
}

/// A source of news headlines.
///
/// Each successful fetch returns a complete batch that replaces the
/// previous one.
pub trait NewsSource: Send + Sync {
    /// Fetch the latest batch of news items.
    fn fetch_news(&self) -> impl Future<Output = Result<Vec<NewsItem>, SourceError>> + Send;
}

/// A reading source that returns the same values on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticReadingSource {
    location: String,
    aqi: f64,
    temperature: f64,
}

impl StaticReadingSource {
    /// Create a source that always reports `aqi` and `temperature`.
    pub fn new(location: impl Into<String>, aqi: f64, temperature: f64) -> Self {
        Self {
            location: location.into(),
            aqi,
            temperature,
        }
    }
}

impl ReadingSource for StaticReadingSource {
    fn next_reading(&mut self) -> Result<Reading, SourceError> {
        Ok(Reading {
            location: self.location.clone(),
            aqi: self.aqi,
            temperature: self.temperature,
            timestamp: Utc::now(),
        })
    }
}

/// A reading source that replays a fixed script of results, then reports
/// [`SourceError::Exhausted`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedReadingSource {
    script: VecDeque<Result<(f64, f64), SourceError>>,
}

impl ScriptedReadingSource {
    /// Create a source from `(aqi, temperature)` pairs or errors.
    pub fn new(script: impl IntoIterator<Item = Result<(f64, f64), SourceError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Number of scripted results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ReadingSource for ScriptedReadingSource {
    fn next_reading(&mut self) -> Result<Reading, SourceError> {
        let (aqi, temperature) = self.script.pop_front().ok_or(SourceError::Exhausted)??;
        Ok(Reading {
            location: String::from("scripted"),
            aqi,
            temperature,
            timestamp: Utc::now(),
        })
    }
}

/// A news source that returns a fixed batch on every fetch.
#[derive(Debug, Clone, Default)]
pub struct StaticNewsSource {
    items: Vec<NewsItem>,
}

impl StaticNewsSource {
    /// Create a source that always returns `items`.
    pub const fn new(items: Vec<NewsItem>) -> Self {
        Self { items }
    }
}

impl NewsSource for StaticNewsSource {
    async fn fetch_news(&self) -> Result<Vec<NewsItem>, SourceError> {
        Ok(self.items.clone())
    }
}
