//! Analysis pipeline — validate → aggregate → fit → assemble, orchestrated.
//!
//! The engine itself is single-threaded and pure; the runner exploits the
//! independence of partitions to fit demand models in parallel, collecting in
//! partition order so output stays bit-for-bit reproducible.

use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use pricelab_core::aggregate::{
    aggregate, filter_to_products, partition, top_products, AggregateRow, SortOrder,
};
use pricelab_core::demand::{self, DemandModel};
use pricelab_core::domain::{GroupKey, GroupLabel, SaleRecord};
use pricelab_core::fingerprint::AnalysisKey;
use pricelab_core::summary::{assemble, SummaryRow};
use pricelab_core::validate::RowError;

use crate::config::AnalysisConfig;
use crate::data_loader::{DataSource, LoadedData};

/// Version of the persisted report format. Bumped on breaking changes;
/// import rejects reports from a newer version.
pub const SCHEMA_VERSION: u32 = 1;

/// The complete result of one analysis run, ready for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub schema_version: u32,

    // ── Identity ──
    pub run_id: String,
    pub dataset_hash: String,
    pub analysis_key: String,
    pub source: DataSource,
    pub generated_at: NaiveDateTime,

    // ── Request ──
    pub group_by: GroupKey,
    pub order: SortOrder,

    // ── Data quality ──
    pub record_count: usize,
    pub rejected: Vec<RowError>,

    // ── Results ──
    pub summaries: Vec<SummaryRow>,
    pub top_breakdown: Option<TopBreakdown>,
}

/// Second-stage rollup restricted to the top-N products: the ranked product
/// names and their product×region aggregate rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopBreakdown {
    pub top_n: usize,
    pub products: Vec<String>,
    pub breakdown_key: String,
    pub rows: Vec<AggregateRow>,
}

/// Fit demand models for every partition of `records` under `key`, in
/// parallel. Partitions are independent, and results are collected in
/// partition first-appearance order, so this is exactly equivalent to
/// `demand::fit_partitions`.
pub fn fit_partitions_parallel(
    records: &[SaleRecord],
    key: GroupKey,
) -> Vec<(GroupLabel, DemandModel)> {
    partition(records, key)
        .into_par_iter()
        .filter_map(|(label, rows)| demand::fit(&rows).map(|model| (label, model)))
        .collect()
}

/// Run the full pipeline over an already-loaded dataset.
///
/// Demand models are fitted at the configured grouping when it carries a
/// product dimension; region-only summaries carry no models (a demand curve
/// needs a product partition) and every summary row reports that absence
/// explicitly.
pub fn run_analysis(config: &AnalysisConfig, loaded: &LoadedData) -> AnalysisReport {
    let opts = &config.analysis;

    let rows = aggregate(&loaded.records, opts.group_by, opts.order);

    let models = match opts.group_by {
        GroupKey::Region => Vec::new(),
        key => fit_partitions_parallel(&loaded.records, key),
    };

    let top_breakdown = opts.top_n.map(|n| {
        let products = top_products(&rows, n);
        let filter: std::collections::BTreeSet<String> = products.iter().cloned().collect();
        let breakdown_key = AnalysisKey {
            group_key: GroupKey::ProductRegion,
            product_filter: Some(filter.clone()),
        }
        .cache_key();
        let filtered = filter_to_products(&loaded.records, &filter);
        let breakdown_rows = aggregate(&filtered, GroupKey::ProductRegion, opts.order);
        TopBreakdown {
            top_n: n,
            products,
            breakdown_key,
            rows: breakdown_rows,
        }
    });

    let analysis_key = AnalysisKey {
        group_key: opts.group_by,
        product_filter: None,
    }
    .cache_key();

    AnalysisReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        dataset_hash: loaded.dataset_hash.clone(),
        analysis_key,
        source: loaded.source,
        generated_at: chrono::Utc::now().naive_utc(),
        group_by: opts.group_by,
        order: opts.order,
        record_count: loaded.records.len(),
        rejected: loaded.rejected.clone(),
        summaries: assemble(rows, &models),
        top_breakdown,
    }
}
