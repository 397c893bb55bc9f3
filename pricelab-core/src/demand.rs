//! Demand Model Fitter — closed-form OLS demand curves per partition.
//!
//! Fits `quantity ≈ intercept + slope * price` over a partition's
//! (price, quantity) pairs and derives point elasticity plus the
//! revenue-maximizing price (vertex of `price * (intercept + slope*price)`).
//! Partitions that cannot support a fit yield `None` — a missing model is a
//! distinct state from a degenerate one, and neither may leak NaN or infinity
//! into downstream tables.

use serde::{Deserialize, Serialize};

use crate::aggregate::partition;
use crate::domain::{GroupKey, GroupLabel, SaleRecord};

/// Minimum observations per partition for a fit. Fewer points make OLS demand
/// estimation unreliable and are skipped unconditionally.
pub const MIN_OBSERVATIONS: usize = 3;

/// A fitted linear demand curve and its derived price-optimization estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandModel {
    pub intercept: f64,
    pub slope: f64,
    pub mean_price: f64,
    pub mean_quantity: f64,
    /// Point elasticity at the sample mean: slope × mean_price / mean_quantity.
    pub elasticity: f64,
    /// Vertex of the implied revenue parabola: −intercept / (2 × slope).
    pub optimal_price: f64,
    pub predicted_quantity: f64,
    pub predicted_revenue: f64,
}

impl DemandModel {
    /// Upward-sloping apparent demand — a data anomaly (noise, too few price
    /// points). The estimates are still computed but the vertex is a revenue
    /// *minimum*; consumers should treat the result as diagnostic-only.
    pub fn is_upward_sloping(&self) -> bool {
        self.slope > 0.0
    }
}

/// Fit a demand curve over one partition's raw rows.
///
/// Returns `None` when the partition has fewer than [`MIN_OBSERVATIONS`] rows,
/// when price variance is (numerically) zero, when the fitted slope is exactly
/// zero (optimal price undefined), or when mean quantity is zero (elasticity
/// undefined).
pub fn fit(records: &[&SaleRecord]) -> Option<DemandModel> {
    let n = records.len();
    if n < MIN_OBSERVATIONS {
        return None;
    }

    let n_f = n as f64;
    let mean_price = records.iter().map(|r| r.price).sum::<f64>() / n_f;
    let mean_quantity = records.iter().map(|r| r.quantity as f64).sum::<f64>() / n_f;

    let mut cov = 0.0;
    let mut var = 0.0;
    for r in records {
        let dp = r.price - mean_price;
        let dq = r.quantity as f64 - mean_quantity;
        cov += dp * dq;
        var += dp * dp;
    }
    cov /= n_f;
    var /= n_f;

    // All prices identical (up to rounding noise): the slope is undefined.
    if var < 1e-12 {
        return None;
    }

    let slope = cov / var;
    let intercept = mean_quantity - slope * mean_price;

    if slope == 0.0 || mean_quantity == 0.0 {
        return None;
    }

    let elasticity = slope * mean_price / mean_quantity;
    let optimal_price = -intercept / (2.0 * slope);
    let predicted_quantity = intercept + slope * optimal_price;
    let predicted_revenue = predicted_quantity * optimal_price;

    Some(DemandModel {
        intercept,
        slope,
        mean_price,
        mean_quantity,
        elasticity,
        optimal_price,
        predicted_quantity,
        predicted_revenue,
    })
}

/// Fit every partition of `records` under `key`, in partition first-appearance
/// order. Partitions without a model are simply absent from the result.
pub fn fit_partitions(records: &[SaleRecord], key: GroupKey) -> Vec<(GroupLabel, DemandModel)> {
    partition(records, key)
        .into_iter()
        .filter_map(|(label, rows)| fit(&rows).map(|model| (label, model)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, make_records, DEFAULT_EPSILON};

    fn fit_owned(records: &[SaleRecord]) -> Option<DemandModel> {
        let refs: Vec<&SaleRecord> = records.iter().collect();
        fit(&refs)
    }

    #[test]
    fn straight_line_demand_is_recovered_exactly() {
        // quantity = 60 - 0.5 * price
        let records = make_records(&[
            ("A", "SP", 100.0, 60.0, 10),
            ("A", "SP", 90.0, 55.0, 15),
            ("A", "SP", 80.0, 50.0, 20),
        ]);
        let model = fit_owned(&records).unwrap();
        assert_approx(model.slope, -0.5, DEFAULT_EPSILON);
        assert_approx(model.intercept, 60.0, DEFAULT_EPSILON);
        assert_approx(model.mean_price, 90.0, DEFAULT_EPSILON);
        assert_approx(model.mean_quantity, 15.0, DEFAULT_EPSILON);
        assert_approx(model.elasticity, -3.0, DEFAULT_EPSILON);
        assert_approx(model.optimal_price, 60.0, DEFAULT_EPSILON);
        assert_approx(model.predicted_quantity, 30.0, DEFAULT_EPSILON);
        assert_approx(model.predicted_revenue, 1800.0, DEFAULT_EPSILON);
        assert!(!model.is_upward_sloping());
    }

    #[test]
    fn two_rows_never_fit() {
        let records = make_records(&[("A", "SP", 100.0, 60.0, 10), ("A", "SP", 80.0, 50.0, 20)]);
        assert!(fit_owned(&records).is_none());
    }

    #[test]
    fn identical_prices_never_fit() {
        let records = make_records(&[
            ("A", "SP", 50.0, 10.0, 10),
            ("A", "SP", 50.0, 10.0, 12),
            ("A", "SP", 50.0, 10.0, 14),
        ]);
        assert!(fit_owned(&records).is_none());
    }

    #[test]
    fn zero_mean_quantity_never_fits() {
        let records = make_records(&[
            ("A", "SP", 10.0, 1.0, 0),
            ("A", "SP", 20.0, 1.0, 0),
            ("A", "SP", 30.0, 1.0, 0),
        ]);
        assert!(fit_owned(&records).is_none());
    }

    #[test]
    fn flat_demand_has_no_model() {
        // Same quantity at every price: slope is exactly zero.
        let records = make_records(&[
            ("A", "SP", 10.0, 1.0, 7),
            ("A", "SP", 20.0, 1.0, 7),
            ("A", "SP", 30.0, 1.0, 7),
        ]);
        assert!(fit_owned(&records).is_none());
    }

    #[test]
    fn upward_slope_is_computed_but_flagged() {
        // quantity rises with price — anomalous, kept as a diagnostic.
        let records = make_records(&[
            ("A", "SP", 10.0, 1.0, 5),
            ("A", "SP", 20.0, 1.0, 10),
            ("A", "SP", 30.0, 1.0, 15),
        ]);
        let model = fit_owned(&records).unwrap();
        assert!(model.is_upward_sloping());
        assert_approx(model.slope, 0.5, DEFAULT_EPSILON);
        // Vertex is a revenue minimum here, reported as-is.
        assert_approx(model.optimal_price, 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn noisy_line_matches_direct_ols() {
        let points: &[(f64, u64)] = &[(10.0, 95), (12.0, 90), (14.0, 88), (16.0, 80), (18.0, 77)];
        let rows: Vec<(&str, &str, f64, f64, i64)> = points
            .iter()
            .map(|&(p, q)| ("A", "SP", p, 1.0, q as i64))
            .collect();
        let records = make_records(&rows);
        let model = fit_owned(&records).unwrap();

        // Direct closed-form OLS on the same points.
        let n = points.len() as f64;
        let mp = points.iter().map(|&(p, _)| p).sum::<f64>() / n;
        let mq = points.iter().map(|&(_, q)| q as f64).sum::<f64>() / n;
        let cov = points
            .iter()
            .map(|&(p, q)| (p - mp) * (q as f64 - mq))
            .sum::<f64>()
            / n;
        let var = points.iter().map(|&(p, _)| (p - mp) * (p - mp)).sum::<f64>() / n;
        let slope = cov / var;
        let intercept = mq - slope * mp;

        assert_approx(model.slope, slope, 1e-9 * slope.abs());
        assert_approx(model.intercept, intercept, 1e-9 * intercept.abs());
    }

    #[test]
    fn fit_partitions_skips_thin_partitions() {
        let records = make_records(&[
            ("A", "SP", 100.0, 60.0, 10),
            ("A", "SP", 90.0, 55.0, 15),
            ("A", "SP", 80.0, 50.0, 20),
            ("B", "SP", 10.0, 1.0, 3),
            ("B", "SP", 12.0, 1.0, 2),
        ]);
        let models = fit_partitions(&records, GroupKey::Product);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].0.product.as_deref(), Some("A"));
    }

    #[test]
    fn fit_partitions_respects_group_key() {
        let records = make_records(&[
            ("A", "SP", 100.0, 60.0, 10),
            ("A", "SP", 90.0, 55.0, 15),
            ("A", "SP", 80.0, 50.0, 20),
            ("A", "RJ", 100.0, 60.0, 8),
            ("A", "RJ", 90.0, 55.0, 12),
            ("A", "RJ", 80.0, 50.0, 16),
        ]);
        let by_product = fit_partitions(&records, GroupKey::Product);
        assert_eq!(by_product.len(), 1);

        let by_both = fit_partitions(&records, GroupKey::ProductRegion);
        assert_eq!(by_both.len(), 2);
        assert_eq!(by_both[0].0.display(), "A / SP");
        assert_eq!(by_both[1].0.display(), "A / RJ");
    }
}
