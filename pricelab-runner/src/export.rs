//! Reporting and export — JSON and CSV artifact generation.
//!
//! Two export formats for analysis reports:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: flat summary and breakdown tables for external tools
//!
//! Absent demand models export as empty cells ("not available"), never as
//! zeros; the same goes for an undefined margin. All persisted artifacts
//! include a `schema_version` field and unknown newer versions are rejected
//! on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use pricelab_core::aggregate::AggregateRow;
use pricelab_core::summary::SummaryRow;

use crate::runner::{AnalysisReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn cell(v: f64, precision: usize) -> String {
    if v.is_finite() {
        format!("{v:.precision$}")
    } else {
        String::new()
    }
}

/// Export summary rows as CSV.
///
/// Columns: product, region, quantity, revenue, cost_amount, mean_price,
/// mean_cost, margin, intercept, slope, elasticity, optimal_price,
/// predicted_quantity, predicted_revenue
pub fn export_summary_csv(rows: &[SummaryRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "product",
        "region",
        "quantity",
        "revenue",
        "cost_amount",
        "mean_price",
        "mean_cost",
        "margin",
        "intercept",
        "slope",
        "elasticity",
        "optimal_price",
        "predicted_quantity",
        "predicted_revenue",
    ])?;

    for row in rows {
        let agg = &row.aggregate;
        let model_cells = match &row.model {
            Some(m) => [
                cell(m.intercept, 6),
                cell(m.slope, 6),
                cell(m.elasticity, 6),
                cell(m.optimal_price, 2),
                cell(m.predicted_quantity, 2),
                cell(m.predicted_revenue, 2),
            ],
            None => Default::default(),
        };
        wtr.write_record([
            agg.label.product.as_deref().unwrap_or(""),
            agg.label.region.as_deref().unwrap_or(""),
            &agg.quantity.to_string(),
            &cell(agg.revenue, 2),
            &cell(agg.cost_amount, 2),
            &cell(agg.mean_price, 4),
            &cell(agg.mean_cost, 4),
            &cell(agg.margin, 6),
            &model_cells[0],
            &model_cells[1],
            &model_cells[2],
            &model_cells[3],
            &model_cells[4],
            &model_cells[5],
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export breakdown rows (product×region aggregates) as CSV.
pub fn export_breakdown_csv(rows: &[AggregateRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "product",
        "region",
        "quantity",
        "revenue",
        "cost_amount",
        "mean_price",
        "mean_cost",
        "margin",
    ])?;

    for agg in rows {
        wtr.write_record([
            agg.label.product.as_deref().unwrap_or(""),
            agg.label.region.as_deref().unwrap_or(""),
            &agg.quantity.to_string(),
            &cell(agg.revenue, 2),
            &cell(agg.cost_amount, 2),
            &cell(agg.mean_price, 4),
            &cell(agg.mean_cost, 4),
            &cell(agg.margin, 6),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact directory ─────────────────────────────────────────────

/// Save the full artifact set for a run: `report.json`, `summary.csv`, and
/// `breakdown.csv` when a top-N breakdown was produced.
///
/// Artifacts land in `<output_dir>/<run_id prefix>/`; returns the run
/// directory.
pub fn save_artifacts(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let short_id: String = report.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(short_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)
        .context("failed to write report.json")?;
    std::fs::write(
        run_dir.join("summary.csv"),
        export_summary_csv(&report.summaries)?,
    )
    .context("failed to write summary.csv")?;

    if let Some(breakdown) = &report.top_breakdown {
        std::fs::write(
            run_dir.join("breakdown.csv"),
            export_breakdown_csv(&breakdown.rows)?,
        )
        .context("failed to write breakdown.csv")?;
    }

    Ok(run_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::data_loader::{load_synthetic, SyntheticSpec};
    use crate::runner::run_analysis;

    fn sample_report() -> AnalysisReport {
        let config = AnalysisConfig::from_toml(
            "[input]\npath = \"unused.csv\"\n\n[analysis]\ntop_n = 3\n",
        )
        .unwrap();
        let loaded = load_synthetic(&SyntheticSpec {
            rows: 300,
            ..SyntheticSpec::default()
        });
        run_analysis(&config, &loaded)
    }

    #[test]
    fn json_round_trips() {
        let report = sample_report();
        let json = export_json(&report).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back.run_id, report.run_id);
        assert_eq!(back.summaries, report.summaries);
    }

    #[test]
    fn newer_schema_version_is_rejected() {
        let mut report = sample_report();
        report.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&report).unwrap();
        assert!(import_json(&json).is_err());
    }

    #[test]
    fn summary_csv_has_header_and_all_rows() {
        let report = sample_report();
        let csv_text = export_summary_csv(&report.summaries).unwrap();
        let lines: Vec<&str> = csv_text.lines().collect();
        assert!(lines[0].starts_with("product,region,quantity"));
        assert_eq!(lines.len(), report.summaries.len() + 1);
    }

    #[test]
    fn absent_model_exports_empty_cells() {
        let mut report = sample_report();
        report.summaries[0].model = None;
        let csv_text = export_summary_csv(&report.summaries).unwrap();
        let first_data_line = csv_text.lines().nth(1).unwrap();
        assert!(first_data_line.ends_with(",,,,,,"), "got: {first_data_line}");
    }
}
