use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Why a single raw record did not make it into the unified product list.
///
/// Every variant is contained at record scope: the rest of the snapshot is
/// still processed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Required field missing or record shape not understood.
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("price is zero or negative")]
    NonPositivePrice,
    #[error("price below configured minimum")]
    BelowMinimumPrice,
    /// Auction no longer running (ended, won, cancelled).
    #[error("auction has ended")]
    Ended,
    #[error("listing marked as sold")]
    Sold,
    /// Cafe board notice rather than a listing.
    #[error("board notice")]
    Notice,
    #[error("title lacks a category keyword")]
    OffTopic,
    #[error("accessory rather than a glove")]
    Accessory,
    #[error("duplicate of an earlier listing")]
    Duplicate,
}

impl SkipReason {
    /// Stable key used when counting skips by kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::Malformed(_) => "malformed",
            SkipReason::NonPositivePrice => "non_positive_price",
            SkipReason::BelowMinimumPrice => "below_minimum_price",
            SkipReason::Ended => "ended",
            SkipReason::Sold => "sold",
            SkipReason::Notice => "notice",
            SkipReason::OffTopic => "off_topic",
            SkipReason::Accessory => "accessory",
            SkipReason::Duplicate => "duplicate",
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        SkipReason::Malformed(detail.into())
    }
}

/// A snapshot file that exists but cannot be used.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot {path} is not valid snapshot JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("snapshot {0} already exists")]
    AlreadyExists(PathBuf),
}

/// Invalid or unreadable configuration. The only error class that stops the
/// pipeline from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid(message.into())
    }
}
