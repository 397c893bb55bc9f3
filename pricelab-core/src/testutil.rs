//! Shared helpers for unit tests.

use crate::domain::SaleRecord;

/// Build validated records from (product, region, price, cost, quantity)
/// tuples. Quantities must be non-negative; this bypasses the validator on
/// purpose so tests control the exact rows.
pub fn make_records(rows: &[(&str, &str, f64, f64, i64)]) -> Vec<SaleRecord> {
    rows.iter()
        .map(|&(product, region, price, cost, quantity)| SaleRecord {
            product: product.to_string(),
            region: region.to_string(),
            price,
            cost,
            quantity: u64::try_from(quantity).expect("test quantities must be >= 0"),
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() <= epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for engine tests.
pub const DEFAULT_EPSILON: f64 = 1e-10;
