//! Deterministic missing-value policy.
//!
//! Monthly series from different publishers start and stop at different
//! dates, so the merged panel is full of short gaps. The fill order is part
//! of the contract: forward fill, then backward fill, then zero-fill the
//! housing-starts column. Reordering these changes the result.

use hearth::panel::{DATE_COLUMN, REGION_KEY_COLUMNS, STARTS_COLUMN};
use polars::prelude::*;

use crate::error::{DataError, Result};

/// Apply the gap-fill policy to a merged panel.
///
/// Fill is scoped per region key with rows sorted by `Date` inside each
/// group: a value never propagates from one region into another, whatever
/// the incoming row order was. Steps, in order:
///
/// 1. forward-fill every value column within its region;
/// 2. backward-fill remaining leading nulls within its region;
/// 3. set `City_Housing_Starts` still null after 1-2 to literal zero
///    ("no recorded construction", not "unknown").
///
/// Running the filler on its own output is a no-op.
///
/// # Errors
///
/// Fails when `df` has no `Date` column, or on any engine error.
pub fn fill_gaps(df: &DataFrame) -> Result<DataFrame> {
    if df.column(DATE_COLUMN).is_err() {
        return Err(DataError::MissingColumn(DATE_COLUMN.to_string()));
    }

    let value_columns: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .filter(|name| !REGION_KEY_COLUMNS.contains(&name.as_str()) && name != DATE_COLUMN)
        .collect();

    let group: Vec<Expr> = REGION_KEY_COLUMNS.iter().map(|key| col(*key)).collect();
    let mut sort_by: Vec<&str> = REGION_KEY_COLUMNS.to_vec();
    sort_by.push(DATE_COLUMN);

    let forward: Vec<Expr> = value_columns
        .iter()
        .map(|c| col(c.as_str()).forward_fill(None).over(group.clone()))
        .collect();
    let backward: Vec<Expr> = value_columns
        .iter()
        .map(|c| col(c.as_str()).backward_fill(None).over(group.clone()))
        .collect();

    let mut filled = df
        .clone()
        .lazy()
        .sort(sort_by, SortMultipleOptions::default())
        .with_columns(forward)
        .with_columns(backward);

    if df.column(STARTS_COLUMN).is_ok() {
        filled = filled.with_column(col(STARTS_COLUMN).fill_null(lit(0.0)));
    }

    Ok(filled.collect()?)
}
