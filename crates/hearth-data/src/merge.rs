//! Panel assembly: outer-join fold and the housing-starts join.
//!
//! The merged panel must contain every (region, month) pair observed in any
//! source, each indicator contributing at most one value per pair. The
//! highest-risk failure in the whole system is the housing-starts join
//! silently matching nothing because of region-name casing or whitespace,
//! so that join reports an explicit match-rate diagnostic instead of
//! trusting the defaults.

use std::fmt;

use hearth::panel::{
    DATE_COLUMN, Indicator, REGION_KEY_COLUMNS, REGION_NAME_COLUMN, STARTS_COLUMN,
    normalized_region_name_expr,
};
use polars::prelude::*;

use crate::error::{DataError, Result};

/// Join keys: the five region identity columns plus the month.
fn key_exprs() -> Vec<Expr> {
    REGION_KEY_COLUMNS
        .iter()
        .map(|key| col(*key))
        .chain(std::iter::once(col(DATE_COLUMN)))
        .collect()
}

/// Outer-join arguments for the indicator fold.
///
/// Keys are coalesced so both sides land in the same columns, and null key
/// fields compare equal: a publisher that omits StateName must still align
/// with another that omits it.
fn outer_join_args() -> JoinArgs {
    let mut args = JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns);
    args.join_nulls = true;
    args
}

/// Remove rows whose `Date` failed to parse, returning the survivors and the
/// number of rows dropped.
///
/// Null-Date rows come from unparsable wide-table column labels; they carry
/// no usable month and must not reach a Date-keyed join.
///
/// # Errors
///
/// Fails when `df` has no `Date` column.
pub fn drop_unresolved_dates(df: DataFrame) -> Result<(DataFrame, usize)> {
    if df.column(DATE_COLUMN).is_err() {
        return Err(DataError::MissingColumn(DATE_COLUMN.to_string()));
    }
    let before = df.height();
    let kept = df
        .lazy()
        .filter(col(DATE_COLUMN).is_not_null())
        .collect()?;
    let dropped = before - kept.height();
    Ok((kept, dropped))
}

/// Fold all per-indicator long tables into one panel via full outer joins on
/// (region key, Date).
///
/// The fold order does not affect the result: the outer join is commutative
/// and associative over the composite key, which the test suite checks
/// rather than assumes. Callers must have dropped null-Date rows first
/// ([`drop_unresolved_dates`]).
///
/// # Errors
///
/// Fails when `tables` is empty or on any engine error.
pub fn merge_long_tables(tables: Vec<DataFrame>) -> Result<DataFrame> {
    let mut tables = tables.into_iter();
    let first = tables.next().ok_or(DataError::NoSources)?;

    let mut acc = first.lazy();
    for table in tables {
        acc = acc.join(table.lazy(), key_exprs(), key_exprs(), outer_join_args());
    }
    Ok(acc.collect()?)
}

/// Materialize a null `Float64` column for every registry indicator missing
/// from the merged panel.
///
/// A source file that was absent on disk contributed no long table, but the
/// panel schema still promises its column: entirely null before the gap
/// filler runs. This also guarantees the feature inputs exist whatever
/// subset of sources loaded.
///
/// # Errors
///
/// Fails on any engine error.
pub fn ensure_indicator_columns(df: DataFrame) -> Result<DataFrame> {
    let present: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut df = df;
    for indicator in Indicator::all() {
        if !present.iter().any(|name| name == indicator.name) {
            df.with_column(Series::full_null(
                indicator.name.into(),
                df.height(),
                &DataType::Float64,
            ))?;
        }
    }
    Ok(df)
}

/// Match-rate diagnostics for the housing-starts join.
///
/// A high null rate for known regions means keys failed to align — the
/// classic symptom of skipped name normalization — and must be surfaced
/// loudly rather than zero-filled away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartsJoinDiagnostics {
    /// Panel rows after the join.
    pub rows: usize,
    /// Rows that found a starts observation.
    pub matched: usize,
    /// Rows left with a null starts value.
    pub unmatched: usize,
}

impl StartsJoinDiagnostics {
    /// Fraction of panel rows with no starts match, in `[0, 1]`.
    pub fn null_rate(&self) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        self.unmatched as f64 / self.rows as f64
    }
}

impl fmt::Display for StartsJoinDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} panel rows matched a starts record ({:.1}% unmatched)",
            self.matched,
            self.rows,
            self.null_rate() * 100.0
        )
    }
}

/// Left-join the housing-starts series onto the panel.
///
/// `RegionName` is normalized on both sides before comparison; the panel
/// keeps the normalized spelling from here on. Regions absent from the
/// starts series keep their rows with a null starts value — the designated
/// zero-fill in the gap filler decides what that null means later.
///
/// # Errors
///
/// Fails when either side lacks the key columns or the starts column.
pub fn join_housing_starts(
    panel: DataFrame,
    starts: DataFrame,
) -> Result<(DataFrame, StartsJoinDiagnostics)> {
    if starts.column(STARTS_COLUMN).is_err() {
        return Err(DataError::MissingColumn(STARTS_COLUMN.to_string()));
    }

    let normalized_panel = panel
        .lazy()
        .with_column(normalized_region_name_expr().alias(REGION_NAME_COLUMN));
    let normalized_starts = starts
        .lazy()
        .with_column(normalized_region_name_expr().alias(REGION_NAME_COLUMN));

    let mut args = JoinArgs::new(JoinType::Left).with_coalesce(JoinCoalesce::CoalesceColumns);
    args.join_nulls = true;

    let joined = normalized_panel
        .join(normalized_starts, key_exprs(), key_exprs(), args)
        .collect()?;

    let rows = joined.height();
    let unmatched = joined.column(STARTS_COLUMN)?.null_count();
    let diagnostics = StartsJoinDiagnostics {
        rows,
        matched: rows - unmatched,
        unmatched,
    };

    Ok((joined, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::wide_to_long;
    use crate::sources::ensure_region_key;

    fn long_table(value_name: &str, region: &str, values: [f64; 2]) -> DataFrame {
        let df = df!(
            "RegionID" => &[1i64],
            "RegionName" => &[region],
            "2020-01-31" => &[values[0]],
            "2020-02-29" => &[values[1]],
        )
        .unwrap();
        wide_to_long(&ensure_region_key(df).unwrap(), value_name).unwrap()
    }

    fn distinct_key_counts(panel: &DataFrame) -> DataFrame {
        panel
            .clone()
            .lazy()
            .group_by(key_exprs())
            .agg([len().alias("n_rows")])
            .collect()
            .unwrap()
    }

    #[test]
    fn test_merge_is_union_of_keys_without_duplicates() {
        let a = long_table("price", "springfield", [100.0, 110.0]);
        let b = long_table("heat", "springfield", [50.0, 55.0]);

        let panel = merge_long_tables(vec![a, b]).unwrap();
        assert_eq!(panel.height(), 2);

        let counts = distinct_key_counts(&panel);
        assert_eq!(counts.height(), 2);
        let n_rows = counts.column("n_rows").unwrap().u32().unwrap();
        assert!((0..counts.height()).all(|i| n_rows.get(i) == Some(1)));

        // both indicators populated on both months
        assert_eq!(panel.column("price").unwrap().null_count(), 0);
        assert_eq!(panel.column("heat").unwrap().null_count(), 0);
    }

    #[test]
    fn test_merge_keeps_unmatched_keys_with_nulls() {
        let a = long_table("price", "springfield", [100.0, 110.0]);
        let b = long_table("heat", "austin", [50.0, 55.0]);

        let panel = merge_long_tables(vec![a, b]).unwrap();
        // union of key sets: 2 months x 2 regions
        assert_eq!(panel.height(), 4);
        assert_eq!(panel.column("price").unwrap().null_count(), 2);
        assert_eq!(panel.column("heat").unwrap().null_count(), 2);
    }

    #[test]
    fn test_merge_fold_order_is_irrelevant() {
        let tables = || {
            vec![
                long_table("price", "springfield", [100.0, 110.0]),
                long_table("heat", "austin", [50.0, 55.0]),
                long_table("sales", "springfield", [7.0, 8.0]),
            ]
        };

        let forward = merge_long_tables(tables()).unwrap();
        let mut reversed_input = tables();
        reversed_input.reverse();
        let reversed = merge_long_tables(reversed_input).unwrap();

        let sort_all = |df: DataFrame| {
            let mut by: Vec<&str> = REGION_KEY_COLUMNS.to_vec();
            by.push(DATE_COLUMN);
            df.lazy()
                .sort(by, SortMultipleOptions::default())
                .select([
                    col("RegionID"),
                    col(DATE_COLUMN),
                    col("price"),
                    col("heat"),
                    col("sales"),
                ])
                .collect()
                .unwrap()
        };
        assert!(sort_all(forward).equals_missing(&sort_all(reversed)));
    }

    #[test]
    fn test_merge_empty_input_is_an_error() {
        assert!(matches!(
            merge_long_tables(Vec::new()),
            Err(DataError::NoSources)
        ));
    }

    #[test]
    fn test_drop_unresolved_dates_counts() {
        let df = df!(
            "RegionID" => &[1i64, 1],
            "RegionName" => &["a", "a"],
            "2020-01-31" => &[1.0, 2.0],
            "not a month" => &[9.0, 9.0],
        )
        .unwrap();
        let long = wide_to_long(&ensure_region_key(df).unwrap(), "x").unwrap();

        let (kept, dropped) = drop_unresolved_dates(long).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(kept.column(DATE_COLUMN).unwrap().null_count(), 0);
    }

    #[test]
    fn test_starts_join_normalizes_names() {
        let panel = merge_long_tables(vec![long_table("price", "Springfield", [100.0, 110.0])])
            .unwrap();

        let starts = df!(
            "RegionID" => &[1i64],
            "SizeRank" => &[None::<i64>],
            "RegionName" => &[" springfield "],
            "RegionType" => &[None::<&str>],
            "StateName" => &[None::<&str>],
            "2020-01-31" => &[25.0],
        )
        .unwrap();
        // reuse the reshaper to get a dated starts frame
        let starts = wide_to_long(&ensure_region_key(starts).unwrap(), STARTS_COLUMN).unwrap();

        let (joined, diagnostics) = join_housing_starts(panel, starts).unwrap();
        assert_eq!(diagnostics.rows, 2);
        // only 2020-01 has a starts record; casing must not cost us that match
        assert_eq!(diagnostics.matched, 1);
        assert!(diagnostics.null_rate() < 0.75);

        let names = joined.column(REGION_NAME_COLUMN).unwrap().str().unwrap();
        assert!((0..joined.height()).all(|i| names.get(i) == Some("springfield")));
    }

    #[test]
    fn test_ensure_indicator_columns_adds_null_columns() {
        let panel = merge_long_tables(vec![long_table(
            "market_heat_index",
            "springfield",
            [50.0, 55.0],
        )])
        .unwrap();

        let panel = ensure_indicator_columns(panel).unwrap();
        for indicator in Indicator::all() {
            let column = panel.column(indicator.name).unwrap();
            if indicator.name == "market_heat_index" {
                assert_eq!(column.null_count(), 0);
            } else {
                assert_eq!(column.null_count(), panel.height(), "{}", indicator.name);
                assert_eq!(column.dtype(), &DataType::Float64);
            }
        }
    }

    #[test]
    fn test_starts_join_keeps_unmatched_regions() {
        let panel =
            merge_long_tables(vec![long_table("price", "gotham", [100.0, 110.0])]).unwrap();
        let starts = df!(
            "RegionID" => &[2i64],
            "SizeRank" => &[None::<i64>],
            "RegionName" => &["austin"],
            "RegionType" => &[None::<&str>],
            "StateName" => &[None::<&str>],
            "2020-01-31" => &[40.0],
        )
        .unwrap();
        let starts = wide_to_long(&ensure_region_key(starts).unwrap(), STARTS_COLUMN).unwrap();

        let (joined, diagnostics) = join_housing_starts(panel, starts).unwrap();
        assert_eq!(joined.height(), 2);
        assert_eq!(diagnostics.matched, 0);
        assert_eq!(joined.column(STARTS_COLUMN).unwrap().null_count(), 2);
    }
}
