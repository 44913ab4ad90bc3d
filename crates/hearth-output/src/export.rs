//! Canonical panel artifact I/O.
//!
//! One CSV file is the whole interface between the pipeline and its
//! consumers. Column order and names are stable across runs and dates are
//! serialized as unambiguous `YYYY-MM-DD` calendar dates.

use std::fs::File;
use std::path::Path;

use hearth::panel::{DATE_COLUMN, panel_columns};
use polars::prelude::*;
use thiserror::Error;

/// Errors that can occur while persisting or loading the panel.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The frame is missing a column the canonical schema requires
    #[error("Panel is missing column: {0}")]
    MissingColumn(String),

    /// The artifact exists but does not look like a panel
    #[error("Malformed panel: {0}")]
    Malformed(String),
}

/// Result type for panel I/O.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Write the panel to its canonical CSV artifact.
///
/// Columns are reordered into [`panel_columns`] order; a frame lacking any
/// of them is rejected rather than silently written with a different
/// schema. The parent directory is created if needed. Any failure here is
/// fatal to a build run — there is no partial artifact.
///
/// # Errors
///
/// Fails when a canonical column is absent or the file cannot be written.
pub fn write_panel(panel: &DataFrame, path: &Path) -> Result<()> {
    let columns = panel_columns();
    for column in &columns {
        if panel.column(column).is_err() {
            return Err(OutputError::MissingColumn((*column).to_string()));
        }
    }

    let mut ordered = panel
        .clone()
        .lazy()
        .select(columns.iter().map(|c| col(*c)).collect::<Vec<_>>())
        .collect()?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_date_format(Some("%Y-%m-%d".to_string()))
        .finish(&mut ordered)?;
    Ok(())
}

/// Load the canonical panel artifact.
///
/// The `Date` column is parsed back to a date dtype; everything else keeps
/// the dtype the reader inferred (keys as integers/strings, values as
/// floats).
///
/// # Errors
///
/// Fails when the file cannot be read or lacks the `Date` column.
pub fn read_panel(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(500))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    if df.column(DATE_COLUMN).is_err() {
        return Err(OutputError::MissingColumn(DATE_COLUMN.to_string()));
    }

    let df = df
        .lazy()
        .with_column(col(DATE_COLUMN).str().to_date(StrptimeOptions {
            format: Some("%Y-%m-%d".into()),
            strict: false,
            ..Default::default()
        }))
        .collect()?;
    Ok(df)
}
