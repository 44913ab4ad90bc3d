//! Panel build orchestration.
//!
//! Drives the stages end to end: load each wide source, reshape it, fold the
//! long tables into one panel, join housing starts, derive features, fill
//! gaps, re-derive features, write the artifact. Explicit data passing, no
//! state shared between stages.

use std::path::PathBuf;

use hearth::panel::{Indicator, with_derived_features};
use hearth_data::{
    StartsJoinDiagnostics, drop_unresolved_dates, ensure_indicator_columns, fill_gaps,
    join_housing_starts, load_housing_starts, load_source, merge_long_tables, wide_to_long,
};
use indicatif::ProgressBar;
use polars::prelude::*;

/// Error type for a panel build run.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    /// Stage error from the data crate.
    #[error("Pipeline stage error: {0}")]
    Data(#[from] hearth_data::DataError),
    /// Core schema/scaler error.
    #[error("Core error: {0}")]
    Core(#[from] hearth::CoreError),
    /// Artifact write error.
    #[error("Output error: {0}")]
    Output(#[from] hearth_output::OutputError),
    /// Polars DataFrame error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Configuration for a panel build run.
#[derive(Debug, Clone)]
pub(crate) struct BuildConfig {
    /// Directory holding the wide per-indicator CSVs.
    pub raw_dir: PathBuf,
    /// Path of the housing-starts CSV.
    pub starts_path: PathBuf,
    /// Warn when the starts join leaves more than this fraction of rows null.
    pub starts_null_warn: f64,
}

/// What happened during a build, for reporting.
#[derive(Debug, Clone)]
pub(crate) struct BuildReport {
    /// Indicators whose files were found and reshaped.
    pub loaded: Vec<&'static str>,
    /// Indicators whose files were absent or malformed (skipped).
    pub skipped: Vec<(&'static str, String)>,
    /// Long rows dropped because their date label failed to parse.
    pub dropped_null_dates: usize,
    /// Housing-starts join match rates.
    pub starts: StartsJoinDiagnostics,
}

impl BuildReport {
    /// True when the starts join missed more rows than the configured
    /// tolerance allows.
    pub fn starts_join_suspicious(&self, warn_rate: f64) -> bool {
        self.starts.null_rate() > warn_rate
    }
}

/// Build the panel from raw sources.
///
/// A missing indicator file is skipped and recorded; a missing or malformed
/// housing-starts file aborts. The returned frame is the finished panel,
/// ready for [`hearth_output::write_panel`].
pub(crate) fn build_panel(
    config: &BuildConfig,
    progress: Option<&ProgressBar>,
) -> Result<(DataFrame, BuildReport), PipelineError> {
    let mut long_tables = Vec::new();
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();
    let mut dropped_null_dates = 0usize;

    for indicator in Indicator::all() {
        if let Some(pb) = progress {
            pb.set_message(format!("Reshaping {}...", indicator.name));
        }

        match load_source(&config.raw_dir, &indicator)? {
            Some(raw) => match wide_to_long(&raw, indicator.name) {
                Ok(long) => {
                    let (long, dropped) = drop_unresolved_dates(long)?;
                    dropped_null_dates += dropped;
                    long_tables.push(long);
                    loaded.push(indicator.name);
                }
                Err(e) => skipped.push((indicator.name, e.to_string())),
            },
            None => skipped.push((indicator.name, "file not found".to_string())),
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    let panel = merge_long_tables(long_tables)?;
    let panel = ensure_indicator_columns(panel)?;

    let starts = load_housing_starts(&config.starts_path)?;
    let (panel, diagnostics) = join_housing_starts(panel, starts)?;

    let panel = with_derived_features(panel.lazy()).collect()?;
    let panel = fill_gaps(&panel)?;
    // the fill can move feature inputs out from under previously derived
    // values; recompute so every stored feature is a row-local function of
    // the filled inputs
    let panel = with_derived_features(panel.lazy()).collect()?;

    Ok((
        panel,
        BuildReport {
            loaded,
            skipped,
            dropped_null_dates,
            starts: diagnostics,
        },
    ))
}
