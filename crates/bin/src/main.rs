//! Hearth CLI binary.
//!
//! Builds the housing-market panel from raw wide CSVs, inspects a built
//! panel, and runs housing-starts scenarios against it.

mod integration;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use hearth::panel::FEATURE_COLUMNS;
use hearth::scenario::{feature_matrix, region_rows, starts_shock};
use hearth::{StandardScaler, panel};
use hearth_output::{read_panel, summarize_panel, write_panel};
use indicatif::{ProgressBar, ProgressStyle};
use integration::panel_pipeline::{BuildConfig, build_panel};
use polars::prelude::*;

/// Default file name of the housing-starts series under the raw directory.
const STARTS_FILE_NAME: &str = "city_level_housing_starts.csv";

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Hearth: housing-market panel pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the canonical panel from a directory of raw indicator CSVs
    Build {
        /// Directory holding the wide per-indicator CSVs
        #[arg(long)]
        raw_dir: PathBuf,

        /// Housing-starts CSV (defaults to city_level_housing_starts.csv
        /// inside the raw directory)
        #[arg(long)]
        starts_file: Option<PathBuf>,

        /// Where to write the panel CSV
        #[arg(long)]
        out: PathBuf,

        /// Also fit a feature scaler on the built panel and write it here
        #[arg(long)]
        scaler_out: Option<PathBuf>,

        /// Warn when more than this fraction of rows has no starts match
        #[arg(long, default_value = "0.5")]
        starts_null_warn: f64,
    },

    /// Summarize an existing panel artifact
    Inspect {
        /// Panel CSV to inspect
        panel: PathBuf,

        /// Output format (json or text)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Rebuild a region's feature matrix under a housing-starts shock
    Scenario {
        /// Panel CSV to read
        #[arg(long)]
        panel: PathBuf,

        /// Region name (matched after trim + lowercase)
        #[arg(long)]
        region: String,

        /// Extra housing units added to every month of the region
        #[arg(long, default_value = "0")]
        extra_units: f64,

        /// Apply a previously fitted scaler to the feature matrix
        #[arg(long)]
        scaler: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            raw_dir,
            starts_file,
            out,
            scaler_out,
            starts_null_warn,
        } => {
            let starts_path = starts_file.unwrap_or_else(|| raw_dir.join(STARTS_FILE_NAME));
            let config = BuildConfig {
                raw_dir,
                starts_path,
                starts_null_warn,
            };
            build(&config, &out, scaler_out.as_deref())?;
        }
        Commands::Inspect { panel, format } => {
            inspect(&panel, &format)?;
        }
        Commands::Scenario {
            panel,
            region,
            extra_units,
            scaler,
        } => {
            scenario(&panel, &region, extra_units, scaler.as_deref())?;
        }
    }

    Ok(())
}

fn build(
    config: &BuildConfig,
    out: &std::path::Path,
    scaler_out: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "HEARTH PANEL BUILD");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Raw directory:  {}", config.raw_dir.display());
    println!("Starts series:  {}", config.starts_path.display());
    println!("Output:         {}\n", out.display());

    let pb = ProgressBar::new(panel::Indicator::all().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );

    let (panel_df, report) = build_panel(config, Some(&pb))?;
    pb.finish_with_message(format!(
        "Merged {} of {} indicators",
        report.loaded.len(),
        panel::Indicator::all().len()
    ));

    for (name, reason) in &report.skipped {
        println!("  Skipped {}: {}", name, reason);
    }
    if report.dropped_null_dates > 0 {
        println!(
            "  Dropped {} rows with unparsable date labels",
            report.dropped_null_dates
        );
    }

    println!("  Starts join: {}", report.starts);
    if report.starts_join_suspicious(config.starts_null_warn) {
        eprintln!(
            "Warning: {:.1}% of panel rows found no housing-starts match \
             (threshold {:.1}%). Check RegionName normalization on both sides.",
            report.starts.null_rate() * 100.0,
            config.starts_null_warn * 100.0
        );
    }

    write_panel(&panel_df, out)?;
    println!("\nWrote panel to {}", out.display());

    if let Some(scaler_path) = scaler_out {
        let scaler = StandardScaler::fit(&panel_df, &FEATURE_COLUMNS)?;
        scaler.to_json_file(scaler_path)?;
        println!("Wrote scaler to {}", scaler_path.display());
    }

    let summary = summarize_panel(&panel_df)?;
    println!("{}", summary.to_ascii_table());

    Ok(())
}

fn inspect(path: &std::path::Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let panel_df = read_panel(path)?;
    let summary = summarize_panel(&panel_df)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => {
            println!("Panel: {}", path.display());
            println!("{}", summary.to_ascii_table());
        }
    }
    Ok(())
}

fn scenario(
    path: &std::path::Path,
    region: &str,
    extra_units: f64,
    scaler_path: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let panel_df = read_panel(path)?;
    let rows = region_rows(&panel_df, region)?;

    let baseline = starts_shock(&rows, 0.0)?;
    let shocked = starts_shock(&rows, extra_units)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!(
        "║{:^62}║",
        format!("STARTS SCENARIO: {}", panel::normalize_region_name(region))
    );
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Months in panel:      {}", rows.height());
    println!("Extra units applied:  {}\n", extra_units);

    for column in [
        panel::STARTS_COLUMN,
        panel::INTERACTION_COLUMN,
        panel::SALES_RATIO_COLUMN,
    ] {
        println!(
            "{:<28} baseline {:>14.3}   shocked {:>14.3}",
            column,
            column_mean(&baseline, column).unwrap_or(f64::NAN),
            column_mean(&shocked, column).unwrap_or(f64::NAN),
        );
    }

    let mut matrix = feature_matrix(&shocked)?;
    if let Some(scaler_path) = scaler_path {
        let scaler = StandardScaler::from_json_file(scaler_path)?;
        matrix = scaler.transform(&matrix)?;
        println!("\nApplied scaler from {}", scaler_path.display());
    }
    println!(
        "\nFeature matrix ready for prediction: {} rows x {} features",
        matrix.height(),
        matrix.width()
    );

    Ok(())
}

fn column_mean(df: &DataFrame, name: &str) -> Option<f64> {
    df.column(name).ok()?.f64().ok()?.mean()
}
