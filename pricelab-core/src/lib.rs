//! PriceLab Core — sales aggregation and price-optimization engine.
//!
//! A pure, stateless computation over an in-memory sales table:
//! - Schema contract and record validation (per-row tolerant, header fatal)
//! - Grouped rollups by product, region, or product×region
//! - Closed-form OLS demand fitting with elasticity and optimal-price
//!   derivation, absent for thin or degenerate partitions
//! - Summary assembly: the left join handed to presentation layers
//! - Deterministic fingerprints for datasets and aggregation requests
//!
//! The engine performs no I/O and holds no state; every output table is
//! freshly allocated. Given the same input and grouping key, output ordering
//! and numeric values are bit-for-bit reproducible.

pub mod aggregate;
pub mod demand;
pub mod domain;
pub mod fingerprint;
pub mod schema;
pub mod summary;
pub mod validate;

#[cfg(test)]
pub(crate) mod testutil;
