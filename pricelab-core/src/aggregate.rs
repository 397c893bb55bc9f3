//! Aggregator — grouped sums and means over validated sales records.
//!
//! Partitions are discovered in insertion order of first appearance (no
//! dependence on hash-iteration order), then sorted by summed quantity with a
//! stable sort, so output is bit-for-bit reproducible across runs. Descending
//! is the canonical "top-N" ordering; ascending exists for consumers that draw
//! the largest value at the far end of a horizontal layout.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::{GroupKey, GroupLabel, SaleRecord};

/// Output ordering of aggregate rows, by summed quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

/// Rolled-up metrics for one partition.
///
/// Created fresh on every aggregation call and never mutated afterwards.
/// `margin` is NaN when the partition has zero revenue — undefined, not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub label: GroupLabel,
    /// Σ quantity over the partition.
    pub quantity: u64,
    /// Σ price × quantity.
    pub revenue: f64,
    /// Σ cost × quantity.
    pub cost_amount: f64,
    /// Unweighted mean of row prices.
    pub mean_price: f64,
    /// Unweighted mean of row costs.
    pub mean_cost: f64,
    /// 1 − cost_amount / revenue; NaN when revenue is 0.
    pub margin: f64,
}

/// Partition records by `key`, preserving first-appearance order.
///
/// Shared by the aggregator and the demand fitter: the fitter consumes each
/// partition's raw rows, not the rolled-up metrics.
pub fn partition(records: &[SaleRecord], key: GroupKey) -> Vec<(GroupLabel, Vec<&SaleRecord>)> {
    let mut index: HashMap<GroupLabel, usize> = HashMap::new();
    let mut parts: Vec<(GroupLabel, Vec<&SaleRecord>)> = Vec::new();

    for record in records {
        let label = key.label_for(record);
        match index.get(&label) {
            Some(&i) => parts[i].1.push(record),
            None => {
                index.insert(label.clone(), parts.len());
                parts.push((label, vec![record]));
            }
        }
    }

    parts
}

/// Compute grouped sums/means over `records` under `key`, sorted by summed
/// quantity in `order`. Ties keep first-appearance order (stable sort).
///
/// Empty input yields an empty table — nothing to summarize is not an error.
pub fn aggregate(records: &[SaleRecord], key: GroupKey, order: SortOrder) -> Vec<AggregateRow> {
    let mut rows: Vec<AggregateRow> = partition(records, key)
        .into_iter()
        .map(|(label, rows)| summarize(label, &rows))
        .collect();

    match order {
        SortOrder::Descending => rows.sort_by(|a, b| b.quantity.cmp(&a.quantity)),
        SortOrder::Ascending => rows.sort_by(|a, b| a.quantity.cmp(&b.quantity)),
    }
    rows
}

fn summarize(label: GroupLabel, rows: &[&SaleRecord]) -> AggregateRow {
    let n = rows.len() as f64;
    let quantity: u64 = rows.iter().map(|r| r.quantity).sum();
    let revenue: f64 = rows.iter().map(|r| r.revenue()).sum();
    let cost_amount: f64 = rows.iter().map(|r| r.cost_amount()).sum();
    let mean_price = rows.iter().map(|r| r.price).sum::<f64>() / n;
    let mean_cost = rows.iter().map(|r| r.cost).sum::<f64>() / n;
    let margin = if revenue == 0.0 {
        f64::NAN
    } else {
        1.0 - cost_amount / revenue
    };

    AggregateRow {
        label,
        quantity,
        revenue,
        cost_amount,
        mean_price,
        mean_cost,
        margin,
    }
}

/// First `n` rows of an aggregate table, in the table's own order.
pub fn top_n(rows: &[AggregateRow], n: usize) -> Vec<AggregateRow> {
    rows.iter().take(n).cloned().collect()
}

/// Product names of the first `n` rows, for the filter-then-regroup pattern.
///
/// Rows whose label carries no product (region-only grouping) are skipped.
pub fn top_products(rows: &[AggregateRow], n: usize) -> Vec<String> {
    rows.iter()
        .filter_map(|r| r.label.product.clone())
        .take(n)
        .collect()
}

/// Restrict a record set to the given products.
///
/// Second stage of the top-N breakdown: rank by `Product`, filter the raw
/// records to the winners, then re-aggregate by `ProductRegion`.
pub fn filter_to_products(records: &[SaleRecord], products: &BTreeSet<String>) -> Vec<SaleRecord> {
    records
        .iter()
        .filter(|r| products.contains(&r.product))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, make_records, DEFAULT_EPSILON};

    // (product, region, price, cost, quantity)
    fn sample() -> Vec<SaleRecord> {
        make_records(&[
            ("A", "SP", 100.0, 60.0, 10),
            ("B", "RJ", 20.0, 5.0, 40),
            ("A", "RJ", 90.0, 55.0, 15),
            ("B", "SP", 25.0, 6.0, 30),
            ("C", "SP", 10.0, 2.0, 5),
        ])
    }

    #[test]
    fn aggregate_by_product_sums_and_sorts_descending() {
        let rows = aggregate(&sample(), GroupKey::Product, SortOrder::Descending);
        assert_eq!(rows.len(), 3);
        // B: 70, A: 25, C: 5
        assert_eq!(rows[0].label.product.as_deref(), Some("B"));
        assert_eq!(rows[0].quantity, 70);
        assert_eq!(rows[1].label.product.as_deref(), Some("A"));
        assert_eq!(rows[1].quantity, 25);
        assert_eq!(rows[2].label.product.as_deref(), Some("C"));

        // A: revenue = 100*10 + 90*15 = 2350, cost = 60*10 + 55*15 = 1425
        assert_approx(rows[1].revenue, 2350.0, DEFAULT_EPSILON);
        assert_approx(rows[1].cost_amount, 1425.0, DEFAULT_EPSILON);
        assert_approx(rows[1].mean_price, 95.0, DEFAULT_EPSILON);
        assert_approx(rows[1].mean_cost, 57.5, DEFAULT_EPSILON);
        assert_approx(rows[1].margin, 1.0 - 1425.0 / 2350.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ascending_order_is_supported() {
        let rows = aggregate(&sample(), GroupKey::Product, SortOrder::Ascending);
        let quantities: Vec<u64> = rows.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![5, 25, 70]);
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let records = make_records(&[
            ("X", "SP", 10.0, 1.0, 7),
            ("Y", "SP", 10.0, 1.0, 7),
            ("Z", "SP", 10.0, 1.0, 7),
        ]);
        let rows = aggregate(&records, GroupKey::Product, SortOrder::Descending);
        let names: Vec<&str> = rows
            .iter()
            .map(|r| r.label.product.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn product_region_partitions_are_distinct() {
        let rows = aggregate(&sample(), GroupKey::ProductRegion, SortOrder::Descending);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].label.display(), "B / RJ");
        assert_eq!(rows[0].quantity, 40);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let rows = aggregate(&[], GroupKey::Product, SortOrder::Descending);
        assert!(rows.is_empty());
    }

    #[test]
    fn zero_revenue_margin_is_nan() {
        let records = make_records(&[("A", "SP", 10.0, 0.0, 0)]);
        let rows = aggregate(&records, GroupKey::Product, SortOrder::Descending);
        assert_eq!(rows[0].quantity, 0);
        assert_eq!(rows[0].revenue, 0.0);
        assert!(rows[0].margin.is_nan());
    }

    #[test]
    fn top_n_truncates_in_order() {
        let rows = aggregate(&sample(), GroupKey::Product, SortOrder::Descending);
        let top = top_n(&rows, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], rows[0]);
        assert_eq!(top[1], rows[1]);
        assert_eq!(top_n(&rows, 10).len(), 3);
    }

    #[test]
    fn filter_then_regroup_restricts_to_top_products() {
        let records = sample();
        let by_product = aggregate(&records, GroupKey::Product, SortOrder::Descending);
        let winners: BTreeSet<String> = top_products(&by_product, 2).into_iter().collect();
        assert_eq!(winners.len(), 2);
        assert!(winners.contains("B") && winners.contains("A"));

        let filtered = filter_to_products(&records, &winners);
        let breakdown = aggregate(&filtered, GroupKey::ProductRegion, SortOrder::Descending);
        assert_eq!(breakdown.len(), 4); // A×{SP,RJ}, B×{SP,RJ}; C is gone
        assert!(breakdown
            .iter()
            .all(|r| r.label.product.as_deref() != Some("C")));
    }
}
