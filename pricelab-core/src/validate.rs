//! Record Validator — per-row value checks and whitespace normalization.
//!
//! Invalid rows are dropped from the output and individually reported, never
//! aborting the whole load: raw sales exports routinely contain a handful of
//! bad rows and the rest of the data must still be usable. Header-level
//! failures are a different animal (fatal `SchemaError`, see `schema`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{RawRecord, SaleRecord};

/// Why a single row was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorKind {
    #[error("price must be > 0")]
    NonPositivePrice,
    #[error("cost must be >= 0")]
    NegativeCost,
    #[error("quantity must be >= 0")]
    NegativeQuantity,
    #[error("numeric field is not finite")]
    NonFiniteNumber,
    #[error("product/region must be non-empty")]
    EmptyField,
    /// Emitted by input providers when a cell cannot be parsed at all.
    /// The validator itself never produces this kind.
    #[error("field could not be parsed")]
    MalformedField,
}

/// A rejected row: its position in the input (0-based data row) and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("row {row}: {kind}")]
pub struct RowError {
    pub row: usize,
    pub kind: RowErrorKind,
}

/// Result of validating a raw row sequence: the surviving records plus a
/// report of every dropped row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validated {
    pub records: Vec<SaleRecord>,
    pub rejected: Vec<RowError>,
}

/// Validate a single raw row.
///
/// `row` is the caller's index for the row (slice position, or file data-row
/// number when called from a loader) and is echoed into the error. String
/// fields are trimmed; a key that is empty after trimming is rejected, since a
/// blank key would silently merge unrelated partitions.
pub fn validate_record(row: usize, raw: &RawRecord) -> Result<SaleRecord, RowError> {
    let reject = |kind| Err(RowError { row, kind });

    if !raw.price.is_finite() || !raw.cost.is_finite() {
        return reject(RowErrorKind::NonFiniteNumber);
    }
    if raw.price <= 0.0 {
        return reject(RowErrorKind::NonPositivePrice);
    }
    if raw.cost < 0.0 {
        return reject(RowErrorKind::NegativeCost);
    }
    if raw.quantity < 0 {
        return reject(RowErrorKind::NegativeQuantity);
    }

    let product = raw.product.trim();
    let region = raw.region.trim();
    if product.is_empty() || region.is_empty() {
        return reject(RowErrorKind::EmptyField);
    }

    Ok(SaleRecord {
        product: product.to_string(),
        region: region.to_string(),
        price: raw.price,
        cost: raw.cost,
        quantity: raw.quantity as u64,
    })
}

/// Validate a raw row sequence. Pure transform: input is untouched, rejected
/// rows are reported by slice position.
pub fn validate(rows: &[RawRecord]) -> Validated {
    let mut records = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();

    for (i, raw) in rows.iter().enumerate() {
        match validate_record(i, raw) {
            Ok(rec) => records.push(rec),
            Err(err) => rejected.push(err),
        }
    }

    Validated { records, rejected }
}
