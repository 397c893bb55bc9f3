//! SaleRecord — the fundamental sales data unit.

use serde::{Deserialize, Serialize};

/// One parsed-but-unvalidated input row, as handed over by an input provider
/// (CSV loader, synthetic generator, test fixture).
///
/// `quantity` is signed at this stage so that negative quantities reach the
/// validator and are rejected per-row instead of silently wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub product: String,
    pub region: String,
    pub price: f64,
    pub cost: f64,
    pub quantity: i64,
}

/// One validated, itemized sales transaction.
///
/// Invariants (enforced by `validate::validate_record`, never re-checked here):
/// `price > 0` and finite, `cost >= 0` and finite, `product`/`region` trimmed
/// and non-empty. The engine never mutates records after validation; every
/// downstream table is freshly derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub product: String,
    pub region: String,
    pub price: f64,
    pub cost: f64,
    pub quantity: u64,
}

impl SaleRecord {
    /// Revenue contributed by this row: price × quantity.
    pub fn revenue(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// Cost amount contributed by this row: unit cost × quantity.
    pub fn cost_amount(&self) -> f64 {
        self.cost * self.quantity as f64
    }
}
