use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::aggregate::PriceBuckets;
use crate::classify::{Classifier, KeywordTables};
use crate::error::ConfigError;
use crate::filter::FilterConfig;
use crate::models::Market;
use crate::pricing::FeeSchedule;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV: &str = "GLOVE_MARKET_CONFIG";

/// Pipeline settings. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding snapshot files
    pub data_dir: PathBuf,
    pub auction_prefix: String,
    pub cafe_prefix: String,
    /// File names containing this marker are test artifacts
    pub test_marker: String,
    /// Offset stamped on snapshots written by `import` (KST)
    pub utc_offset_hours: i32,
    pub fees: FeeSchedule,
    pub price_buckets: PriceBuckets,
    pub filter: FilterConfig,
    pub keywords: KeywordTables,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            auction_prefix: "yahoo_auction".to_string(),
            cafe_prefix: "yayongsa".to_string(),
            test_marker: "test".to_string(),
            utc_offset_hours: 9,
            fees: FeeSchedule::default(),
            price_buckets: PriceBuckets::default(),
            filter: FilterConfig::default(),
            keywords: KeywordTables::default(),
        }
    }
}

impl PipelineConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load from `path` if given, else from `GLOVE_MARKET_CONFIG`, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(env_path) => Self::load(Path::new(&env_path)),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, prefix) in [
            ("auction_prefix", &self.auction_prefix),
            ("cafe_prefix", &self.cafe_prefix),
        ] {
            if prefix.trim().is_empty() {
                return Err(ConfigError::invalid(format!("{} is empty", name)));
            }
            if !self.test_marker.is_empty()
                && prefix.to_lowercase().contains(&self.test_marker.to_lowercase())
            {
                return Err(ConfigError::invalid(format!(
                    "{} '{}' contains the test marker '{}'",
                    name, prefix, self.test_marker
                )));
            }
        }
        if self.auction_prefix.to_lowercase() == self.cafe_prefix.to_lowercase() {
            return Err(ConfigError::invalid("auction and cafe prefixes are identical"));
        }

        let fees = &self.fees;
        if !(fees.exchange_rate.is_finite() && fees.exchange_rate > 0.0) {
            return Err(ConfigError::invalid("exchange_rate must be positive"));
        }
        for (name, value) in [
            ("weight_kg", fees.weight_kg),
            ("shipping_fee_per_kg", fees.shipping_fee_per_kg),
            ("agent_fee_rate", fees.agent_fee_rate),
            ("customs_rate", fees.customs_rate),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::invalid(format!("{} must be non-negative", name)));
            }
        }
        if fees.customs_threshold < 0 {
            return Err(ConfigError::invalid("customs_threshold must be non-negative"));
        }

        self.price_buckets.validate()?;
        Classifier::new(&self.keywords)?;
        self.utc_offset()?;
        Ok(())
    }

    pub fn prefix_for(&self, market: Market) -> &str {
        match market {
            Market::Auction => &self.auction_prefix,
            Market::Cafe => &self.cafe_prefix,
        }
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            ConfigError::invalid(format!(
                "utc_offset_hours {} is out of range",
                self.utc_offset_hours
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "data_dir": "/srv/snapshots", "fees": {{ "exchange_rate": 9.5 }} }}"#
        )
        .unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/snapshots"));
        assert_eq!(config.fees.exchange_rate, 9.5);
        assert_eq!(config.fees.customs_threshold, 21_739);
        assert_eq!(config.auction_prefix, "yahoo_auction");
    }

    #[test]
    fn missing_brand_table_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "keywords": {{ "brands": [] }} }}"#).unwrap();

        assert!(matches!(
            PipelineConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unreadable_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PipelineConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            PipelineConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_bad_values() {
        let zero_rate = PipelineConfig {
            fees: FeeSchedule {
                exchange_rate: 0.0,
                ..FeeSchedule::default()
            },
            ..PipelineConfig::default()
        };
        assert!(zero_rate.validate().is_err());

        let test_prefix = PipelineConfig {
            auction_prefix: "yahoo_test".to_string(),
            ..PipelineConfig::default()
        };
        assert!(test_prefix.validate().is_err());

        let bad_offset = PipelineConfig {
            utc_offset_hours: 30,
            ..PipelineConfig::default()
        };
        assert!(bad_offset.validate().is_err());
    }
}
