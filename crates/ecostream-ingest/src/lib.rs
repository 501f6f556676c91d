//! Production collaborators for the EcoStream loops.
//!
//! - [`sensors`] -- [`SimulatedReadingSource`], a seeded random sensor feed
//!   standing in for real AQI and weather stations.
//! - [`rss`] -- [`RssNewsSource`], which fetches an RSS feed over HTTP and
//!   turns its first items into [`NewsItem`]s.
//!
//! Both implement the collaborator traits from
//! [`ecostream_core::source`], so the loops never depend on them directly.
//!
//! [`NewsItem`]: ecostream_types::NewsItem

pub mod error;
pub mod rss;
pub mod sensors;

pub use error::IngestError;
pub use rss::{FeedParser, RssNewsSource};
pub use sensors::SimulatedReadingSource;
