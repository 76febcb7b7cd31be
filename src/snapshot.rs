//! Snapshot files: one immutable JSON document per crawl run, named
//! `<prefix>_<YYYYMMDD_HHMMSS>.json`.
//!
//! The timestamp format sorts lexicographically in chronological order, so
//! the newest snapshot is the greatest file name. Names containing the test
//! marker are never live data.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::SnapshotError;

pub const SNAPSHOT_SUFFIX: &str = ".json";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;

/// A loaded snapshot; records stay as JSON until a normalizer reads them
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub crawled_at: Option<DateTime<FixedOffset>>,
    pub total_count: Option<u64>,
    pub products: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Wrapped {
        crawled_at: Option<String>,
        total_count: Option<u64>,
        products: Vec<Value>,
    },
    /// Older crawler output: a bare array of records
    Bare(Vec<Value>),
}

#[derive(Serialize)]
struct SnapshotOut<'a, T> {
    crawled_at: String,
    total_count: usize,
    products: &'a [T],
}

/// Whether `file_name` is a live snapshot for `prefix`.
pub fn is_live_snapshot(file_name: &str, prefix: &str, test_marker: &str) -> bool {
    let name = file_name.to_lowercase();
    let marker = test_marker.to_lowercase();

    name.ends_with(SNAPSHOT_SUFFIX)
        && name.contains(&prefix.to_lowercase())
        && (marker.is_empty() || !name.contains(&marker))
}

/// Newest live snapshot for `prefix` in `dir`, by descending file name.
///
/// A missing directory has no snapshots.
pub fn latest_snapshot(dir: &Path, prefix: &str, test_marker: &str) -> io::Result<Option<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "snapshot directory does not exist");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if is_live_snapshot(&name, prefix, test_marker) {
            candidates.push(name);
        }
    }

    candidates.sort_unstable_by(|a, b| b.cmp(a));
    Ok(candidates.into_iter().next().map(|name| dir.join(name)))
}

pub fn snapshot_file_name(prefix: &str, at: &DateTime<FixedOffset>) -> String {
    format!("{}_{}{}", prefix, at.format(TIMESTAMP_FORMAT), SNAPSHOT_SUFFIX)
}

/// Creation time embedded in a snapshot file name.
pub fn parse_snapshot_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let stem = file_name.strip_suffix(SNAPSHOT_SUFFIX)?;
    let start = stem.len().checked_sub(TIMESTAMP_LEN)?;
    let stamp = stem.get(start..)?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    parse_snapshot(&text).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_snapshot(text: &str) -> Result<Snapshot, serde_json::Error> {
    let document: SnapshotDocument = serde_json::from_str(text)?;
    Ok(match document {
        SnapshotDocument::Wrapped {
            crawled_at,
            total_count,
            products,
        } => Snapshot {
            crawled_at: crawled_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok()),
            total_count,
            products,
        },
        SnapshotDocument::Bare(products) => Snapshot {
            products,
            ..Snapshot::default()
        },
    })
}

/// Persist scraped records as a new snapshot in `dir`.
///
/// The document is written to a temporary name first and renamed into
/// place, so readers listing `dir` never see a partial file.
pub fn write_snapshot<T: Serialize>(
    dir: &Path,
    prefix: &str,
    products: &[T],
    now: DateTime<FixedOffset>,
) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;

    let path = dir.join(snapshot_file_name(prefix, &now));
    if path.exists() {
        return Err(SnapshotError::AlreadyExists(path));
    }

    let document = SnapshotOut {
        crawled_at: now.to_rfc3339(),
        total_count: products.len(),
        products,
    };
    let json = serde_json::to_string_pretty(&document).map_err(|source| SnapshotError::Parse {
        path: path.clone(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_error(&tmp))?;
    fs::rename(&tmp, &path).map_err(io_error(&path))?;

    info!(path = %path.display(), count = products.len(), "wrote snapshot");
    Ok(path)
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> SnapshotError {
    let path = path.to_path_buf();
    move |source| SnapshotError::Io { path, source }
}
