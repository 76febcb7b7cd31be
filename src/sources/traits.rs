use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::SkipReason;
use crate::models::{Market, NormalizedProduct};
use crate::sources::types::{IngestReport, SkippedRecord};

/// Common trait for per-marketplace normalizers.
/// Adding a marketplace means a raw record type plus one implementation.
pub trait SourceNormalizer: Send + Sync {
    /// Record shape written by this marketplace's scraper
    type Raw: DeserializeOwned;

    fn market(&self) -> Market;

    /// Turn one raw record into a product, or say why it was left out
    fn normalize(&self, raw: &Self::Raw) -> Result<NormalizedProduct, SkipReason>;

    /// Normalize a record straight from snapshot JSON. Shapes that do not
    /// deserialize are malformed records, not file errors.
    fn normalize_value(&self, value: &Value) -> Result<NormalizedProduct, SkipReason> {
        let raw = Self::Raw::deserialize(value).map_err(|e| SkipReason::malformed(e.to_string()))?;
        self.normalize(&raw)
    }

    /// Normalize a snapshot's records, dropping later duplicates of a URL
    /// (or of a title when the URL is empty).
    fn normalize_all(&self, values: &[Value]) -> IngestReport {
        let mut report = IngestReport::default();
        let mut seen = HashSet::new();

        for (index, value) in values.iter().enumerate() {
            let outcome = self.normalize_value(value).and_then(|product| {
                let key = if product.url.is_empty() {
                    format!("title:{}", product.title)
                } else {
                    format!("url:{}", product.url)
                };
                if seen.insert(key) {
                    Ok(product)
                } else {
                    Err(SkipReason::Duplicate)
                }
            });

            match outcome {
                Ok(product) => report.products.push(product),
                Err(reason) => {
                    match &reason {
                        SkipReason::Malformed(detail) => {
                            warn!(market = %self.market(), index, %detail, "skipping malformed record")
                        }
                        other => debug!(market = %self.market(), index, reason = other.kind(), "record filtered out"),
                    }
                    report.skipped.push(SkippedRecord { index, reason });
                }
            }
        }

        info!(
            market = %self.market(),
            admitted = report.products.len(),
            skipped = report.skipped.len(),
            "normalized snapshot records"
        );

        report
    }
}
