//! Panel schema: region key, indicator registry and column ordering.
//!
//! The canonical panel has one row per (region, month). Its columns are the
//! five region-key fields, the `Date`, one column per market indicator, the
//! city housing-starts series, and the two derived features. Everything that
//! reads or writes the panel resolves column names through this module.

mod features;

pub use features::{
    DERIVED_COLUMNS, INTERACTION_COLUMN, SALES_RATIO_COLUMN, with_derived_features,
};

use polars::prelude::*;

/// Region identity columns shared by every source table, in key order.
///
/// `RegionID` is the stable identifier across publishers; `RegionName` is
/// only join-safe after [`normalize_region_name`].
pub const REGION_KEY_COLUMNS: [&str; 5] = [
    "RegionID",
    "SizeRank",
    "RegionName",
    "RegionType",
    "StateName",
];

/// Name of the calendar-month column produced by the reshaper.
pub const DATE_COLUMN: &str = "Date";

/// Name of the region-name key column.
pub const REGION_NAME_COLUMN: &str = "RegionName";

/// City housing starts, the supplementary per-region-per-month series.
pub const STARTS_COLUMN: &str = "City_Housing_Starts";

/// Market heat index column, one input of the interaction feature.
pub const MARKET_HEAT_COLUMN: &str = "market_heat_index";

/// Sales count nowcast column, the denominator of the sales ratio feature.
pub const SALES_COUNT_COLUMN: &str = "sales_count_nowcast";

/// The smoothed home-value index the downstream models predict.
pub const TARGET_COLUMN: &str = "zhvi_all_homes_smoothed";

/// Fixed ordered feature list every model consumer selects before scaling.
///
/// Order matters: the scaler and the fitted models are positional, so this
/// list is the single source of truth for feature order.
pub const FEATURE_COLUMNS: [&str; 10] = [
    "City_Housing_Starts",
    "new_construction_sales_all_homes",
    "market_heat_index",
    "percent_sold_above_list_all_homes",
    "percent_sold_below_list_all_homes",
    "sales_count_nowcast",
    "total_transaction_value_all_homes",
    "zhvi_all_homes_smoothed",
    "Housing_Market_Interaction",
    "Housing_Sales_Ratio",
];

/// A monthly market indicator published as a wide per-region table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    /// Column name the indicator's values take in the panel.
    pub name: &'static str,
    /// File name of the wide CSV under the raw data directory.
    pub file_name: &'static str,
}

impl Indicator {
    /// All indicators the pipeline ingests, in panel column order.
    pub const fn all() -> [Self; 15] {
        [
            Self {
                name: "new_construction_sales_all_homes",
                file_name: "new_construction_sales_all_homes_monthly.csv",
            },
            Self {
                name: "new_construction_sales_condo_coop",
                file_name: "new_construction_sales_condo_coop_monthly.csv",
            },
            Self {
                name: "new_construction_sales_sfr",
                file_name: "new_construction_sales_sfr_monthly.csv",
            },
            Self {
                name: "median_sale_price_all_homes",
                file_name: "median_sale_price_all_homes_monthly.csv",
            },
            Self {
                name: "median_list_price_all_homes",
                file_name: "median_list_price_all_homes_monthly.csv",
            },
            Self {
                name: "market_heat_index",
                file_name: "market_heat_index_all_homes_monthly.csv",
            },
            Self {
                name: "percent_sold_above_list_all_homes",
                file_name: "percent_sold_above_list_all_homes_monthly.csv",
            },
            Self {
                name: "percent_sold_below_list_all_homes",
                file_name: "percent_sold_below_list_all_homes_monthly.csv",
            },
            Self {
                name: "sales_count_nowcast",
                file_name: "sales_count_nowcast_all_homes_monthly.csv",
            },
            Self {
                name: "total_transaction_value_all_homes",
                file_name: "total_transaction_value_all_homes_monthly.csv",
            },
            Self {
                name: "zhvi_all_homes_smoothed",
                file_name: "zhvi_all_homes_smoothed.csv",
            },
            Self {
                name: "zhvi_condo_coop",
                file_name: "zhvi_condo_coop.csv",
            },
            Self {
                name: "zhvi_single_family_homes",
                file_name: "zhvi_single_family_homes.csv",
            },
            Self {
                name: "median_days_to_pending_all_homes",
                file_name: "median_days_to_pending_all_homes_monthly.csv",
            },
            Self {
                name: "median_days_to_close_all_homes",
                file_name: "median_days_to_close_all_homes_monthly.csv",
            },
        ]
    }
}

/// Canonical column order of the written panel.
///
/// Key columns, `Date`, indicator columns in registry order, housing starts,
/// then the derived features. Downstream code selects by name, but a stable
/// order keeps the artifact diffable across runs.
pub fn panel_columns() -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = REGION_KEY_COLUMNS.to_vec();
    columns.push(DATE_COLUMN);
    columns.extend(Indicator::all().iter().map(|i| i.name));
    columns.push(STARTS_COLUMN);
    columns.extend(DERIVED_COLUMNS);
    columns
}

/// Normalize a region name for joining: trim surrounding whitespace and
/// lower-case. Idempotent.
pub fn normalize_region_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Expression form of [`normalize_region_name`], applied to `RegionName`.
pub fn normalized_region_name_expr() -> Expr {
    col(REGION_NAME_COLUMN)
        .str()
        .strip_chars(lit(NULL))
        .str()
        .to_lowercase()
}
