//! PriceLab CLI — sales analysis and demo-data commands.
//!
//! Commands:
//! - `analyze` — load a sales CSV, run the aggregation/optimization pipeline,
//!   print the summary table, and save artifacts
//! - `synthetic` — write a seeded synthetic sales CSV for demos and testing

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pricelab_core::aggregate::SortOrder;
use pricelab_core::domain::GroupKey;
use pricelab_runner::{
    load_csv, run_analysis, save_artifacts, write_synthetic_csv, AnalysisConfig, AnalysisReport,
    SyntheticSpec,
};

#[derive(Parser)]
#[command(
    name = "pricelab",
    about = "PriceLab CLI — retail sales aggregation and price optimization"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a sales CSV: summaries, demand models, optimal prices.
    Analyze {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the input CSV (alternative to --config).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Grouping key: product, region, product_region.
        #[arg(long, default_value = "product")]
        group_by: String,

        /// Sort ascending by quantity instead of descending.
        #[arg(long, default_value_t = false)]
        ascending: bool,

        /// Restrict the region breakdown to the top N products.
        #[arg(long)]
        top: Option<usize>,

        /// Field delimiter for the input CSV.
        #[arg(long, default_value = ",")]
        delimiter: char,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Skip writing artifacts.
        #[arg(long, default_value_t = false)]
        no_artifacts: bool,
    },
    /// Write a seeded synthetic sales CSV.
    Synthetic {
        /// Output path.
        #[arg(long, default_value = "sales.csv")]
        out: PathBuf,

        /// Number of distinct products.
        #[arg(long, default_value_t = 12)]
        products: usize,

        /// Number of distinct regions.
        #[arg(long, default_value_t = 6)]
        regions: usize,

        /// Number of data rows.
        #[arg(long, default_value_t = 2000)]
        rows: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            config,
            input,
            group_by,
            ascending,
            top,
            delimiter,
            output_dir,
            no_artifacts,
        } => run_analyze(
            config, input, group_by, ascending, top, delimiter, output_dir, no_artifacts,
        ),
        Commands::Synthetic {
            out,
            products,
            regions,
            rows,
            seed,
        } => run_synthetic(out, products, regions, rows, seed),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    group_by: String,
    ascending: bool,
    top: Option<usize>,
    delimiter: char,
    output_dir: PathBuf,
    no_artifacts: bool,
) -> Result<()> {
    if config_path.is_some() && input.is_some() {
        bail!("--config and --input are mutually exclusive");
    }

    let config = if let Some(path) = config_path {
        AnalysisConfig::from_file(&path)?
    } else {
        let Some(input) = input else {
            bail!("one of --config or --input is required");
        };
        build_config_from_flags(input, &group_by, ascending, top, delimiter)?
    };

    let loaded = load_csv(&config.input.path, config.input.delimiter as u8)?;
    if loaded.records.is_empty() {
        bail!(
            "no valid rows in '{}' ({} rejected)",
            config.input.path.display(),
            loaded.rejected.len()
        );
    }

    let report = run_analysis(&config, &loaded);
    print_summary(&report);

    if !no_artifacts {
        let run_dir = save_artifacts(&report, &output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn build_config_from_flags(
    input: PathBuf,
    group_by: &str,
    ascending: bool,
    top: Option<usize>,
    delimiter: char,
) -> Result<AnalysisConfig> {
    let group_by = match group_by {
        "product" => GroupKey::Product,
        "region" => GroupKey::Region,
        "product_region" => GroupKey::ProductRegion,
        other => bail!("unknown group key '{other}'. Valid: product, region, product_region"),
    };
    let order = if ascending {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };

    // Build a TOML string and parse it — ensures flag-built configs go
    // through the same validation path as file-based ones.
    let toml_str = format!(
        r#"[input]
path = {path:?}
delimiter = "{delim}"

[analysis]
group_by = "{key}"
order = "{order}"
{top_line}
"#,
        path = input.display().to_string(),
        delim = delimiter,
        key = match group_by {
            GroupKey::Product => "product",
            GroupKey::Region => "region",
            GroupKey::ProductRegion => "product_region",
        },
        order = match order {
            SortOrder::Descending => "descending",
            SortOrder::Ascending => "ascending",
        },
        top_line = match top {
            Some(n) => format!("top_n = {n}"),
            None => String::new(),
        },
    );

    Ok(AnalysisConfig::from_toml(&toml_str)?)
}

fn run_synthetic(out: PathBuf, products: usize, regions: usize, rows: usize, seed: u64) -> Result<()> {
    let spec = SyntheticSpec {
        products,
        regions,
        rows,
        seed,
    };
    write_synthetic_csv(&out, &spec)?;
    println!(
        "Wrote {rows} rows ({products} products × {regions} regions, seed {seed}) to {}",
        out.display()
    );
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    println!();
    println!("=== Sales Summary ===");
    println!("Run:            {}", &report.run_id[..12]);
    println!("Records:        {}", report.record_count);
    if !report.rejected.is_empty() {
        println!("Rejected rows:  {}", report.rejected.len());
        for err in report.rejected.iter().take(10) {
            eprintln!("  WARNING: {err}");
        }
        if report.rejected.len() > 10 {
            eprintln!("  ... and {} more", report.rejected.len() - 10);
        }
    }
    println!();
    println!(
        "{:<22} {:>8} {:>12} {:>8} {:>10} {:>11}",
        "Group", "Qty", "Revenue", "Margin", "Opt.Price", "Elasticity"
    );
    println!("{}", "-".repeat(76));
    for summary in &report.summaries {
        let agg = &summary.aggregate;
        let margin = if agg.margin.is_finite() {
            format!("{:.1}%", agg.margin * 100.0)
        } else {
            "n/a".to_string()
        };
        let (optimal, elasticity) = match &summary.model {
            Some(m) => {
                // Upward-sloping fits are anomalies; mark them.
                let flag = if m.is_upward_sloping() { "^" } else { "" };
                (
                    format!("{:.2}{flag}", m.optimal_price),
                    format!("{:.2}", m.elasticity),
                )
            }
            None => ("n/a".to_string(), "n/a".to_string()),
        };
        println!(
            "{:<22} {:>8} {:>12.2} {:>8} {:>10} {:>11}",
            agg.label.display(),
            agg.quantity,
            agg.revenue,
            margin,
            optimal,
            elasticity
        );
    }

    if let Some(breakdown) = &report.top_breakdown {
        println!();
        println!(
            "--- Top {} products, by region ---",
            breakdown.products.len()
        );
        println!(
            "{:<22} {:>8} {:>12} {:>8}",
            "Product / Region", "Qty", "Revenue", "Margin"
        );
        println!("{}", "-".repeat(54));
        for row in &breakdown.rows {
            let margin = if row.margin.is_finite() {
                format!("{:.1}%", row.margin * 100.0)
            } else {
                "n/a".to_string()
            };
            println!(
                "{:<22} {:>8} {:>12.2} {:>8}",
                row.label.display(),
                row.quantity,
                row.revenue,
                margin
            );
        }
    }
    println!();
}
