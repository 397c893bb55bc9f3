//! Input table contract — the boundary between input providers and the engine.
//!
//! Defines the required column set for a sales table. Providers validate the
//! header once (fatal on a missing column); per-row value checks live in
//! `validate`. Extra columns are permitted: the contract is "at least these
//! fields", so raw exports with trailing presentation columns still load.

use thiserror::Error;

/// Required columns of the sales table, in canonical order.
pub const REQUIRED_COLUMNS: &[&str] = &["product", "region", "price", "cost", "quantity"];

/// Fatal header failure: one or more required columns are absent.
///
/// No partial result is produced from a table that fails this check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required column(s): {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

/// Positions of the required columns within a provider's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub product: usize,
    pub region: usize,
    pub price: usize,
    pub cost: usize,
    pub quantity: usize,
}

/// Resolve the required columns against a header row.
///
/// Header cells are trimmed and matched case-insensitively (raw sources carry
/// inconsistent padding and casing). Fails with `SchemaError` listing every
/// missing column at once.
pub fn column_indices(header: &[&str]) -> Result<ColumnIndices, SchemaError> {
    let find = |name: &str| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let mut missing = Vec::new();
    for name in REQUIRED_COLUMNS {
        if find(name).is_none() {
            missing.push((*name).to_string());
        }
    }
    if !missing.is_empty() {
        return Err(SchemaError { missing });
    }

    Ok(ColumnIndices {
        product: find("product").unwrap(),
        region: find("region").unwrap(),
        price: find("price").unwrap(),
        cost: find("cost").unwrap(),
        quantity: find("quantity").unwrap(),
    })
}

/// Validate that a header row carries every required column.
pub fn validate_header(header: &[&str]) -> Result<(), SchemaError> {
    column_indices(header).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_header_passes() {
        let header = ["product", "region", "price", "cost", "quantity"];
        assert!(validate_header(&header).is_ok());
    }

    #[test]
    fn extra_columns_are_permitted() {
        let header = ["product", "region", "price", "cost", "quantity", "channel"];
        let idx = column_indices(&header).unwrap();
        assert_eq!(idx.product, 0);
        assert_eq!(idx.quantity, 4);
    }

    #[test]
    fn padded_and_cased_header_passes() {
        let header = [" Product ", "REGION", "price", " Cost", "Quantity "];
        let idx = column_indices(&header).unwrap();
        assert_eq!(idx.region, 1);
        assert_eq!(idx.cost, 3);
    }

    #[test]
    fn missing_columns_all_reported() {
        let header = ["product", "price"];
        let err = validate_header(&header).unwrap_err();
        assert_eq!(err.missing, vec!["region", "cost", "quantity"]);
        let msg = err.to_string();
        assert!(msg.contains("region"));
        assert!(msg.contains("quantity"));
    }

    #[test]
    fn reordered_header_resolves_indices() {
        let header = ["quantity", "cost", "price", "region", "product"];
        let idx = column_indices(&header).unwrap();
        assert_eq!(idx.quantity, 0);
        assert_eq!(idx.product, 4);
    }
}
