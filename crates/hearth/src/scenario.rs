//! Housing-starts scenario transform behind the interactive panel.
//!
//! The dashboard's question is "what happens to the value index if this
//! region adds N housing units per month?". Answering it only needs panel
//! rows: add the units, re-derive the interaction and ratio features, select
//! the fixed feature list, scale, predict. Everything except the predict call
//! lives here.

use polars::prelude::*;

use crate::error::{CoreError, Result};
use crate::panel::{
    FEATURE_COLUMNS, STARTS_COLUMN, normalize_region_name, normalized_region_name_expr,
    with_derived_features,
};

/// Select the panel rows for one region, matching by normalized name.
///
/// # Errors
///
/// Returns [`CoreError::RegionNotFound`] when no row matches.
pub fn region_rows(panel: &DataFrame, region: &str) -> Result<DataFrame> {
    let wanted = normalize_region_name(region);
    let rows = panel
        .clone()
        .lazy()
        .filter(normalized_region_name_expr().eq(lit(wanted.as_str())))
        .collect()?;

    if rows.height() == 0 {
        return Err(CoreError::RegionNotFound(wanted));
    }
    Ok(rows)
}

/// Add `extra_units` to `City_Housing_Starts` and re-derive the dependent
/// features.
///
/// With `extra_units == 0.0` this is the identity on the feature columns,
/// which is what the dashboard uses as its baseline.
///
/// # Errors
///
/// Fails when the starts or feature input columns are absent.
pub fn starts_shock(rows: &DataFrame, extra_units: f64) -> Result<DataFrame> {
    let shocked = with_derived_features(
        rows.clone()
            .lazy()
            .with_column((col(STARTS_COLUMN) + lit(extra_units)).alias(STARTS_COLUMN)),
    )
    .collect()?;
    Ok(shocked)
}

/// Select the fixed ordered feature list as the model input matrix.
///
/// # Errors
///
/// Fails when a feature column is absent from `df`.
pub fn feature_matrix(df: &DataFrame) -> Result<DataFrame> {
    for feature in FEATURE_COLUMNS {
        if df.column(feature).is_err() {
            return Err(CoreError::MissingColumn(feature.to_string()));
        }
    }
    let exprs: Vec<Expr> = FEATURE_COLUMNS.iter().map(|c| col(*c)).collect();
    Ok(df.clone().lazy().select(exprs).collect()?)
}
