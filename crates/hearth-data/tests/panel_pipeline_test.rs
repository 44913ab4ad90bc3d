//! End-to-end pipeline tests over real CSV fixtures on disk.

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use hearth::panel::{
    DATE_COLUMN, Indicator, REGION_NAME_COLUMN, STARTS_COLUMN, with_derived_features,
};
use hearth_data::{
    drop_unresolved_dates, ensure_indicator_columns, fill_gaps, join_housing_starts,
    load_housing_starts, load_source, merge_long_tables, wide_to_long,
};
use polars::prelude::*;

fn indicator(name: &str) -> Indicator {
    Indicator::all()
        .into_iter()
        .find(|i| i.name == name)
        .unwrap_or_else(|| panic!("unknown indicator {name}"))
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Run the whole build over a raw directory, the way the CLI does.
fn build_panel(raw_dir: &Path, starts_path: &Path) -> (DataFrame, f64) {
    let mut long_tables = Vec::new();
    for ind in Indicator::all() {
        if let Some(raw) = load_source(raw_dir, &ind).unwrap() {
            let long = wide_to_long(&raw, ind.name).unwrap();
            let (long, _dropped) = drop_unresolved_dates(long).unwrap();
            long_tables.push(long);
        }
    }

    let panel = merge_long_tables(long_tables).unwrap();
    let panel = ensure_indicator_columns(panel).unwrap();

    let starts = load_housing_starts(starts_path).unwrap();
    let (panel, diagnostics) = join_housing_starts(panel, starts).unwrap();

    let panel = with_derived_features(panel.lazy()).collect().unwrap();
    let panel = fill_gaps(&panel).unwrap();
    // re-derive so stored features stay row-local functions of the filled
    // inputs, including zero-filled starts
    let panel = with_derived_features(panel.lazy()).collect().unwrap();

    (panel, diagnostics.null_rate())
}

/// The casing/whitespace scenario: one heat-index source spells the region
/// `"springfield "` while the starts series spells it `"Springfield"`. The
/// merged panel must still align both on the normalized key.
#[test]
fn test_mismatched_casing_still_aligns() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        indicator("market_heat_index").file_name,
        "RegionID,RegionName,2020-01-31,2020-02-29\n1,springfield ,50,55\n",
    );
    write_file(
        dir.path(),
        "city_level_housing_starts.csv",
        "RegionID,RegionName,Date,City_Housing_Starts\n\
         1,Springfield,2020-01-31,100\n\
         1,Springfield,2020-02-29,110\n",
    );

    let (panel, null_rate) = build_panel(dir.path(), &dir.path().join("city_level_housing_starts.csv"));

    // exactly one row per month for the normalized key
    assert_eq!(panel.height(), 2);
    let names = panel.column(REGION_NAME_COLUMN).unwrap().str().unwrap();
    assert!((0..2).all(|i| names.get(i) == Some("springfield")));

    // the join matched every row; anything else here is silent corruption
    assert!(null_rate < 0.05, "starts null rate {null_rate} too high");

    let sorted = panel
        .lazy()
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .collect()
        .unwrap();
    let starts = sorted.column(STARTS_COLUMN).unwrap().f64().unwrap();
    let heat = sorted.column("market_heat_index").unwrap().f64().unwrap();
    let interaction = sorted
        .column("Housing_Market_Interaction")
        .unwrap()
        .f64()
        .unwrap();

    assert_relative_eq!(starts.get(0).unwrap(), 100.0);
    assert_relative_eq!(heat.get(0).unwrap(), 50.0);
    assert_relative_eq!(interaction.get(0).unwrap(), 100.0 * 50.0);
    assert_relative_eq!(interaction.get(1).unwrap(), 110.0 * 55.0);
}

/// An absent indicator file must not abort the build; its column is filled
/// from nothing (all null pre-fill, then forward/backward fill has nothing
/// to propagate) while every other column is untouched.
#[test]
fn test_missing_source_is_survivable() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        indicator("zhvi_all_homes_smoothed").file_name,
        "RegionID,RegionName,2020-01-31,2020-02-29\n1,springfield,200000,201000\n",
    );
    write_file(
        dir.path(),
        "city_level_housing_starts.csv",
        "RegionID,RegionName,Date,City_Housing_Starts\n\
         1,springfield,2020-01-31,10\n",
    );

    let (panel, _) = build_panel(dir.path(), &dir.path().join("city_level_housing_starts.csv"));

    assert_eq!(panel.height(), 2);
    // the loaded indicator came through intact
    assert_eq!(
        panel
            .column("zhvi_all_homes_smoothed")
            .unwrap()
            .null_count(),
        0
    );
    // absent indicators stay entirely null even after the fill pass
    assert_eq!(
        panel.column("market_heat_index").unwrap().null_count(),
        panel.height()
    );
    // starts is the designated zero-fillable column: month two had no
    // record, forward fill covers it from month one
    let sorted = panel
        .lazy()
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .collect()
        .unwrap();
    let starts = sorted.column(STARTS_COLUMN).unwrap().f64().unwrap();
    assert_relative_eq!(starts.get(0).unwrap(), 10.0);
    assert_relative_eq!(starts.get(1).unwrap(), 10.0);
}

/// A region entirely absent from the starts series ends at exactly zero
/// starts, and its ratio feature reflects the zero, not a stale null.
#[test]
fn test_unmatched_region_zero_fills_starts() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        indicator("sales_count_nowcast").file_name,
        "RegionID,RegionName,2020-01-31\n1,gotham,4\n",
    );
    write_file(
        dir.path(),
        "city_level_housing_starts.csv",
        "RegionID,RegionName,Date,City_Housing_Starts\n\
         2,metropolis,2020-01-31,50\n",
    );

    let (panel, null_rate) = build_panel(dir.path(), &dir.path().join("city_level_housing_starts.csv"));

    assert_eq!(panel.height(), 1);
    assert_relative_eq!(null_rate, 1.0);

    let starts = panel.column(STARTS_COLUMN).unwrap().f64().unwrap();
    assert_relative_eq!(starts.get(0).unwrap(), 0.0);

    let ratio = panel.column("Housing_Sales_Ratio").unwrap().f64().unwrap();
    assert_relative_eq!(ratio.get(0).unwrap(), 0.0 / (4.0 + 1.0));
}

/// Stored derived features must equal their row-local recomputation on every
/// row of a built panel.
#[test]
fn test_feature_determinism_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        indicator("market_heat_index").file_name,
        "RegionID,RegionName,2020-01-31,2020-02-29\n1,springfield,50,55\n2,austin,70,72\n",
    );
    write_file(
        dir.path(),
        indicator("sales_count_nowcast").file_name,
        "RegionID,RegionName,2020-01-31,2020-02-29\n1,springfield,10,12\n2,austin,7,9\n",
    );
    write_file(
        dir.path(),
        "city_level_housing_starts.csv",
        "RegionID,RegionName,Date,City_Housing_Starts\n\
         1,springfield,2020-01-31,100\n\
         1,springfield,2020-02-29,110\n\
         2,austin,2020-01-31,40\n",
    );

    let (panel, _) = build_panel(dir.path(), &dir.path().join("city_level_housing_starts.csv"));
    let recomputed = with_derived_features(panel.clone().lazy()).collect().unwrap();
    assert!(panel.equals_missing(&recomputed));
}
