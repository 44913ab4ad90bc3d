//! Raw source table loading.
//!
//! Each indicator arrives as one wide CSV: region identity columns plus one
//! column per calendar month. Publishers are not consistent about which
//! identity columns they include, so the loader forces every table into the
//! same key shape (absent fields become typed null columns) and pins the key
//! dtypes so later joins cannot fail on dtype drift.

use std::path::{Path, PathBuf};

use hearth::panel::{
    DATE_COLUMN, Indicator, REGION_KEY_COLUMNS, STARTS_COLUMN, normalized_region_name_expr,
};
use polars::prelude::*;

use crate::error::{DataError, Result};

/// Canonical dtype for a region-key column.
fn key_dtype(column: &str) -> DataType {
    match column {
        "RegionID" | "SizeRank" => DataType::Int64,
        _ => DataType::String,
    }
}

/// Path of an indicator's wide CSV under the raw data directory.
pub fn source_path(raw_dir: &Path, indicator: &Indicator) -> PathBuf {
    raw_dir.join(indicator.file_name)
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(500))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Force the uniform region-key shape onto a raw table.
///
/// Identity columns the publisher omitted are materialized as null columns of
/// the canonical dtype; present ones are cast to it. All remaining columns
/// pass through untouched.
pub fn ensure_region_key(df: DataFrame) -> Result<DataFrame> {
    let present: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut df = df;
    for key in REGION_KEY_COLUMNS {
        if !present.iter().any(|name| name == key) {
            df.with_column(Series::full_null(key.into(), df.height(), &key_dtype(key)))?;
        }
    }

    let casts: Vec<Expr> = REGION_KEY_COLUMNS
        .iter()
        .map(|key| col(*key).cast(key_dtype(key)))
        .collect();
    Ok(df.lazy().with_columns(casts).collect()?)
}

/// Load one indicator's wide table.
///
/// Returns `Ok(None)` when the file does not exist: a missing optional source
/// must not abort the pipeline, it simply contributes no values. Every other
/// failure is a real error.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_source(raw_dir: &Path, indicator: &Indicator) -> Result<Option<DataFrame>> {
    let path = source_path(raw_dir, indicator);
    if !path.exists() {
        return Ok(None);
    }
    let df = read_csv(&path)?;
    Ok(Some(ensure_region_key(df)?))
}

/// Load the city housing-starts series.
///
/// Unlike the indicator sources this file is required: it carries the join
/// key for the supplementary series, so any failure here is fatal to the run.
/// The frame comes back with canonical key dtypes, a parsed `Date` column,
/// `RegionName` already normalized, and only the columns the join needs.
///
/// # Errors
///
/// Fails when the file is missing, unreadable, or lacks the `Date` or
/// starts column.
pub fn load_housing_starts(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(DataError::StartsFile {
            path: path.display().to_string(),
            reason: "file not found".to_string(),
        });
    }
    let df = read_csv(path)?;

    for required in [DATE_COLUMN, STARTS_COLUMN] {
        if df.column(required).is_err() {
            return Err(DataError::StartsFile {
                path: path.display().to_string(),
                reason: format!("missing column {required}"),
            });
        }
    }

    let df = ensure_region_key(df)?;

    let mut select: Vec<Expr> = REGION_KEY_COLUMNS.iter().map(|c| col(*c)).collect();
    select.push(
        col(DATE_COLUMN)
            .str()
            .to_date(StrptimeOptions {
                format: Some("%Y-%m-%d".into()),
                strict: false,
                ..Default::default()
            })
            .alias(DATE_COLUMN),
    );
    select.push(col(STARTS_COLUMN).cast(DataType::Float64));

    let df = df
        .lazy()
        .with_column(normalized_region_name_expr().alias("RegionName"))
        .select(select)
        .collect()?;
    Ok(df)
}
