//! Wide-to-long reshaping.
//!
//! A wide indicator table has one row per region and one column per calendar
//! month. Joining indicators requires long format: one row per (region,
//! month) with a single value column named after the indicator.

use hearth::panel::{DATE_COLUMN, REGION_KEY_COLUMNS};
use polars::prelude::*;

use crate::error::{DataError, Result};

/// Unpivot a wide indicator table into long format.
///
/// Every non-key column is treated as a calendar-month label. The label
/// column is parsed into a `Date` non-strictly: a label that is not a valid
/// `YYYY-MM-DD` date yields a null `Date` rather than an error, and callers
/// must drop those rows before any Date-keyed join. Values are cast to
/// `Float64` regardless of what the CSV reader inferred.
///
/// Output cardinality is (identity rows) x (date columns).
///
/// # Errors
///
/// Fails when the table has no date columns at all, or on any engine error.
pub fn wide_to_long(df: &DataFrame, value_name: &str) -> Result<DataFrame> {
    let date_labels: Vec<PlSmallStr> = df
        .get_columns()
        .iter()
        .map(|c| c.name().clone())
        .filter(|name| !REGION_KEY_COLUMNS.contains(&name.as_str()))
        .collect();

    if date_labels.is_empty() {
        return Err(DataError::NoDateColumns {
            indicator: value_name.to_string(),
        });
    }

    let args = UnpivotArgsDSL {
        on: date_labels
            .iter()
            .map(|name| col(name.as_str()).into())
            .collect(),
        index: REGION_KEY_COLUMNS.iter().map(|key| col(*key).into()).collect(),
        variable_name: Some(DATE_COLUMN.into()),
        value_name: Some(value_name.into()),
    };

    let long = df
        .clone()
        .lazy()
        .unpivot(args)
        .with_columns([
            col(DATE_COLUMN).str().to_date(StrptimeOptions {
                format: Some("%Y-%m-%d".into()),
                strict: false,
                ..Default::default()
            }),
            col(value_name).cast(DataType::Float64),
        ])
        .collect()?;

    Ok(long)
}
