//! Analysis fingerprinting — deterministic identification of datasets and
//! aggregation requests.
//!
//! - `AnalysisKey`: the `(GroupKey, product filter)` tuple that identifies one
//!   aggregation request. Callers that memoize aggregations key their cache by
//!   `cache_key()`; the engine itself keeps no cache (the computation is
//!   cheap).
//! - `dataset_fingerprint`: BLAKE3 over the validated record set, for run
//!   manifests and reproducibility checks.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{GroupKey, SaleRecord};

/// Identity of one aggregation request.
///
/// Uses `BTreeSet` for the filter so serialization order is deterministic
/// before hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisKey {
    pub group_key: GroupKey,
    pub product_filter: Option<BTreeSet<String>>,
}

impl AnalysisKey {
    /// Deterministic cache key: BLAKE3 over the canonical JSON form.
    pub fn cache_key(&self) -> String {
        let json = serde_json::to_string(self).expect("AnalysisKey must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// BLAKE3 fingerprint of a validated record set.
///
/// Hashes each record's canonical JSON in sequence, so the fingerprint is
/// stable across runs and sensitive to row order and every field value.
pub fn dataset_fingerprint(records: &[SaleRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    for record in records {
        let json = serde_json::to_string(record).expect("SaleRecord must serialize");
        hasher.update(json.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}
