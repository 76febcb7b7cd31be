//! Ingestion and normalization of scraped baseball-glove listings from a
//! Japanese auction site and a Korean cafe marketplace.
//!
//! Snapshots written by the scrapers are read from disk, filtered,
//! classified, priced and merged into [`NormalizedProduct`]s, then summarized
//! into [`Statistics`]. See [`Pipeline`] for the entry points.

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod pricing;
pub mod snapshot;
pub mod sources;

pub use aggregate::{aggregate, PriceBuckets, SourceStats, Statistics};
pub use config::PipelineConfig;
pub use error::{ConfigError, SkipReason, SnapshotError};
pub use models::{AgeGroup, Condition, Market, NormalizedProduct, Position};
pub use pipeline::{Pipeline, SourceFilter, SourceIngest};
