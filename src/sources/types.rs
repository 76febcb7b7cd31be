use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::SkipReason;
use crate::models::NormalizedProduct;

/// A record left out of the product list, with its position in the snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: SkipReason,
}

/// Outcome of normalizing every record of one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub products: Vec<NormalizedProduct>,
    pub skipped: Vec<SkippedRecord>,
}

impl IngestReport {
    /// Records seen, admitted or not
    pub fn total(&self) -> usize {
        self.products.len() + self.skipped.len()
    }

    /// Skip counts keyed by [`SkipReason::kind`]
    pub fn skip_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for skipped in &self.skipped {
            *counts.entry(skipped.reason.kind()).or_insert(0) += 1;
        }
        counts
    }
}
