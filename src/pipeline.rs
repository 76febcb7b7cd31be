//! Entry points for the presentation layer.
//!
//! Every call re-reads the newest snapshot per market and derives products
//! from scratch. Missing or unreadable snapshots degrade that market to zero
//! products; callers always get a complete result.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{error, info, warn};

use crate::aggregate::{aggregate, Statistics};
use crate::classify::Classifier;
use crate::config::PipelineConfig;
use crate::error::ConfigError;
use crate::filter::ListingFilter;
use crate::models::{Market, NormalizedProduct};
use crate::snapshot::{latest_snapshot, load_snapshot};
use crate::sources::{AuctionNormalizer, CafeNormalizer, IngestReport, SourceNormalizer};

/// Which markets a product listing should include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    All,
    Only(Market),
}

impl SourceFilter {
    pub fn markets(&self) -> Vec<Market> {
        match self {
            SourceFilter::All => Market::ALL.to_vec(),
            SourceFilter::Only(market) => vec![*market],
        }
    }
}

impl FromStr for SourceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(SourceFilter::All)
        } else {
            s.parse().map(SourceFilter::Only)
        }
    }
}

impl fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFilter::All => f.write_str("all"),
            SourceFilter::Only(market) => write!(f, "{}", market),
        }
    }
}

/// What was read for one market and what came out of it
#[derive(Debug, Clone, Serialize)]
pub struct SourceIngest {
    pub market: Market,
    /// `None` when no live snapshot was found or it could not be read
    pub snapshot: Option<PathBuf>,
    pub crawled_at: Option<DateTime<FixedOffset>>,
    pub report: IngestReport,
}

impl SourceIngest {
    fn empty(market: Market) -> Self {
        Self {
            market,
            snapshot: None,
            crawled_at: None,
            report: IngestReport::default(),
        }
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    auction: AuctionNormalizer,
    cafe: CafeNormalizer,
}

impl Pipeline {
    /// Validate `config` and build the normalizers. Configuration errors are
    /// the only failures the pipeline reports.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let filter = ListingFilter::new(&config.filter);
        let classifier = Classifier::new(&config.keywords)?;

        Ok(Self {
            auction: AuctionNormalizer::new(
                filter.clone(),
                classifier.clone(),
                config.fees.clone(),
            ),
            cafe: CafeNormalizer::new(filter, classifier),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Newest live snapshot for `market`, if any
    pub fn latest_snapshot(&self, market: Market) -> Option<PathBuf> {
        match latest_snapshot(
            &self.config.data_dir,
            self.config.prefix_for(market),
            &self.config.test_marker,
        ) {
            Ok(path) => path,
            Err(e) => {
                error!(%market, dir = %self.config.data_dir.display(), error = %e, "failed to list snapshot directory");
                None
            }
        }
    }

    /// Read and normalize the newest snapshot for one market.
    pub fn ingest(&self, market: Market) -> SourceIngest {
        let Some(path) = self.latest_snapshot(market) else {
            warn!(%market, dir = %self.config.data_dir.display(), "no snapshot found, treating market as empty");
            return SourceIngest::empty(market);
        };

        let snapshot = match load_snapshot(&path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(%market, error = ?e, "unreadable snapshot, treating market as empty");
                return SourceIngest::empty(market);
            }
        };

        info!(%market, path = %path.display(), records = snapshot.products.len(), "loaded snapshot");

        let report = match market {
            Market::Auction => self.auction.normalize_all(&snapshot.products),
            Market::Cafe => self.cafe.normalize_all(&snapshot.products),
        };

        SourceIngest {
            market,
            snapshot: Some(path),
            crawled_at: snapshot.crawled_at,
            report,
        }
    }

    pub fn ingest_all(&self, filter: SourceFilter) -> Vec<SourceIngest> {
        filter.markets().into_iter().map(|m| self.ingest(m)).collect()
    }

    /// Merged product list, auction listings first
    pub fn products(&self, filter: SourceFilter) -> Vec<NormalizedProduct> {
        self.ingest_all(filter)
            .into_iter()
            .flat_map(|ingest| ingest.report.products)
            .collect()
    }

    /// Statistics over both markets
    pub fn statistics(&self) -> Statistics {
        aggregate(&self.products(SourceFilter::All), &self.config.price_buckets)
    }

    /// Statistics over already ingested markets, without re-reading files
    pub fn statistics_for(&self, ingests: &[SourceIngest]) -> Statistics {
        let products: Vec<NormalizedProduct> = ingests
            .iter()
            .flat_map(|ingest| ingest.report.products.iter().cloned())
            .collect();
        aggregate(&products, &self.config.price_buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_filter_parses() {
        assert_eq!("all".parse::<SourceFilter>().unwrap(), SourceFilter::All);
        assert_eq!(
            "yahoo".parse::<SourceFilter>().unwrap(),
            SourceFilter::Only(Market::Auction)
        );
        assert_eq!(
            "cafe".parse::<SourceFilter>().unwrap(),
            SourceFilter::Only(Market::Cafe)
        );
        assert!("ebay".parse::<SourceFilter>().is_err());
    }

    #[test]
    fn invalid_config_prevents_startup() {
        let config = PipelineConfig {
            cafe_prefix: String::new(),
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn missing_directory_yields_zeroed_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(PipelineConfig {
            data_dir: dir.path().join("absent"),
            ..PipelineConfig::default()
        })
        .unwrap();

        let stats = pipeline.statistics();
        assert_eq!(stats.overall.count, 0);
        assert_eq!(stats.auction.average_price, 0);
        assert_eq!(stats.cafe.average_price, 0);
        assert!(pipeline.products(SourceFilter::All).is_empty());
    }
}
