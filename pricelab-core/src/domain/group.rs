//! Grouping keys and partition labels.

use serde::{Deserialize, Serialize};

use crate::domain::record::SaleRecord;

/// Which columns a rollup partitions by.
///
/// Grouping is order-irrelevant over the key columns; output ordering is the
/// aggregator's concern (stable quantity sort, see `aggregate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Product,
    Region,
    ProductRegion,
}

impl GroupKey {
    /// Extracts the partition label of `record` under this key.
    pub fn label_for(&self, record: &SaleRecord) -> GroupLabel {
        match self {
            GroupKey::Product => GroupLabel {
                product: Some(record.product.clone()),
                region: None,
            },
            GroupKey::Region => GroupLabel {
                product: None,
                region: Some(record.region.clone()),
            },
            GroupKey::ProductRegion => GroupLabel {
                product: Some(record.product.clone()),
                region: Some(record.region.clone()),
            },
        }
    }
}

/// A partition key *value*: exactly the fields named by the `GroupKey` that
/// produced it are `Some`.
///
/// `Ord` gives labels a total order so they can key `BTreeMap`s and serialize
/// deterministically; row ordering in output tables never depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupLabel {
    pub product: Option<String>,
    pub region: Option<String>,
}

impl GroupLabel {
    /// Human-readable form: `"SKU-01"`, `"SP"`, or `"SKU-01 / SP"`.
    pub fn display(&self) -> String {
        match (&self.product, &self.region) {
            (Some(p), Some(r)) => format!("{p} / {r}"),
            (Some(p), None) => p.clone(),
            (None, Some(r)) => r.clone(),
            (None, None) => String::new(),
        }
    }
}
