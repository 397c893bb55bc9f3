//! PriceLab Runner — analysis orchestration on top of `pricelab-core`.
//!
//! This crate builds on the engine to provide:
//! - Sales table loading from delimited-text files (header-checked, per-row
//!   tolerant) and a seeded synthetic generator
//! - TOML run configuration with content-addressed run IDs
//! - The end-to-end pipeline with parallel per-partition demand fitting
//! - JSON/CSV artifact export with schema versioning

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{AnalysisConfig, AnalysisSection, ConfigError, InputSection, RunId};
pub use data_loader::{
    load_csv, load_synthetic, write_synthetic_csv, DataSource, LoadError, LoadedData,
    SyntheticSpec,
};
pub use export::{
    export_breakdown_csv, export_json, export_summary_csv, import_json, save_artifacts,
};
pub use runner::{
    fit_partitions_parallel, run_analysis, AnalysisReport, TopBreakdown, SCHEMA_VERSION,
};
