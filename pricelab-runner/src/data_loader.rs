//! Sales table loading for the runner.
//!
//! Implements the "input provider" side of the engine contract: locate a
//! delimited-text table, check its header against the schema contract (fatal),
//! hand each data row through the validator (per-row tolerant), and report
//! what was dropped. Also provides a seeded synthetic dataset generator for
//! demos and tests — synthetic data is tagged with its provenance so reports
//! can never pass it off as a real load.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pricelab_core::domain::{RawRecord, SaleRecord};
use pricelab_core::fingerprint::dataset_fingerprint;
use pricelab_core::schema::{self, ColumnIndices, SchemaError};
use pricelab_core::validate::{validate_record, RowError, RowErrorKind};

/// Errors from the data loading layer.
///
/// Per-row problems are *not* errors at this level — they land in
/// `LoadedData::rejected` and the load proceeds.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Where a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    File,
    Synthetic,
}

/// Result of loading a sales table: validated records, the per-row rejection
/// report, a BLAKE3 fingerprint over the validated set, and provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub records: Vec<SaleRecord>,
    pub rejected: Vec<RowError>,
    pub dataset_hash: String,
    pub source: DataSource,
}

/// Load a sales table from a delimited-text file with a header row.
///
/// The header is resolved against the schema contract before any row is read
/// (missing columns are fatal). Rows that cannot be parsed or fail validation
/// are reported by 0-based data-row index and dropped, matching the
/// tolerant-load behavior presentation layers rely on.
pub fn load_csv(path: &Path, delimiter: u8) -> Result<LoadedData, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let header_cells: Vec<&str> = headers.iter().collect();
    let cols = schema::column_indices(&header_cells)?;

    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let Ok(cells) = result else {
            rejected.push(RowError {
                row,
                kind: RowErrorKind::MalformedField,
            });
            continue;
        };
        match parse_row(&cells, &cols) {
            Ok(raw) => match validate_record(row, &raw) {
                Ok(record) => records.push(record),
                Err(err) => rejected.push(err),
            },
            Err(kind) => rejected.push(RowError { row, kind }),
        }
    }

    let dataset_hash = dataset_fingerprint(&records);
    Ok(LoadedData {
        records,
        rejected,
        dataset_hash,
        source: DataSource::File,
    })
}

fn parse_row(cells: &csv::StringRecord, cols: &ColumnIndices) -> Result<RawRecord, RowErrorKind> {
    let cell = |i: usize| cells.get(i).ok_or(RowErrorKind::MalformedField);
    let number = |i: usize| -> Result<f64, RowErrorKind> {
        cell(i)?
            .trim()
            .parse::<f64>()
            .map_err(|_| RowErrorKind::MalformedField)
    };
    let integer = |i: usize| -> Result<i64, RowErrorKind> {
        cell(i)?
            .trim()
            .parse::<i64>()
            .map_err(|_| RowErrorKind::MalformedField)
    };

    Ok(RawRecord {
        product: cell(cols.product)?.to_string(),
        region: cell(cols.region)?.to_string(),
        price: number(cols.price)?,
        cost: number(cols.cost)?,
        quantity: integer(cols.quantity)?,
    })
}

// ─── Synthetic data ─────────────────────────────────────────────────

/// Parameters for the synthetic sales generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    pub products: usize,
    pub regions: usize,
    pub rows: usize,
    pub seed: u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            products: 12,
            regions: 6,
            rows: 2_000,
            seed: 42,
        }
    }
}

const REGION_POOL: &[&str] = &["SP", "RJ", "MG", "RS", "PR", "BA", "SC", "PE", "CE", "GO"];

fn region_name(i: usize) -> String {
    REGION_POOL
        .get(i)
        .map(|r| r.to_string())
        .unwrap_or_else(|| format!("R{i:02}"))
}

/// Generate raw rows with plausible downward-sloping demand per product.
///
/// Seeded and fully deterministic: the same spec always yields the same rows.
pub fn synthetic_records(spec: &SyntheticSpec) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(spec.seed);

    struct ProductShape {
        name: String,
        base_price: f64,
        cost_ratio: f64,
        intercept: f64,
        slope: f64,
    }

    let shapes: Vec<ProductShape> = (0..spec.products.max(1))
        .map(|p| ProductShape {
            name: format!("SKU-{:02}", p + 1),
            base_price: rng.gen_range(15.0..120.0),
            cost_ratio: rng.gen_range(0.4..0.7),
            intercept: rng.gen_range(80.0..200.0),
            slope: -rng.gen_range(0.5..2.0),
        })
        .collect();

    (0..spec.rows)
        .map(|_| {
            let shape = &shapes[rng.gen_range(0..shapes.len())];
            let region = region_name(rng.gen_range(0..spec.regions.max(1)));
            let price = round_cents(shape.base_price * rng.gen_range(0.8..1.2));
            let expected = shape.intercept + shape.slope * price + rng.gen_range(-8.0..8.0);
            RawRecord {
                product: shape.name.clone(),
                region,
                price,
                cost: round_cents(shape.base_price * shape.cost_ratio),
                quantity: expected.max(0.0) as i64,
            }
        })
        .collect()
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Validate a synthetic dataset in memory, tagged with its provenance.
pub fn load_synthetic(spec: &SyntheticSpec) -> LoadedData {
    let raw = synthetic_records(spec);
    let validated = pricelab_core::validate::validate(&raw);
    let dataset_hash = dataset_fingerprint(&validated.records);
    LoadedData {
        records: validated.records,
        rejected: validated.rejected,
        dataset_hash,
        source: DataSource::Synthetic,
    }
}

/// Write a synthetic dataset as a CSV with the canonical header.
pub fn write_synthetic_csv(path: &Path, spec: &SyntheticSpec) -> Result<(), LoadError> {
    let map_err = |source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(map_err)?;
    writer.write_record(schema::REQUIRED_COLUMNS).map_err(map_err)?;
    for row in synthetic_records(spec) {
        writer
            .write_record([
                row.product.as_str(),
                row.region.as_str(),
                &format!("{:.2}", row.price),
                &format!("{:.2}", row.cost),
                &row.quantity.to_string(),
            ])
            .map_err(map_err)?;
    }
    writer.flush().map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    Ok(())
}
