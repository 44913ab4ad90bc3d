//! Panel summary reporting.
//!
//! A quick health report over a built or loaded panel: how many rows and
//! regions, which months it spans, and how many nulls each column still
//! carries. The CLI prints it after a build and on `inspect`.

use std::fmt;

use chrono::NaiveDate;
use hearth::panel::{DATE_COLUMN, REGION_NAME_COLUMN};
use polars::prelude::*;
use serde::Serialize;

use crate::export::{OutputError, Result};

/// Null count for a single panel column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnNullCount {
    /// Column name.
    pub column: String,
    /// Number of null cells.
    pub nulls: usize,
}

/// Summary statistics over a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSummary {
    /// Total number of (region, month) rows.
    pub rows: usize,
    /// Number of distinct region names.
    pub regions: usize,
    /// Earliest month in the panel, if any rows carry a date.
    pub period_start: Option<NaiveDate>,
    /// Latest month in the panel, if any rows carry a date.
    pub period_end: Option<NaiveDate>,
    /// Per-column null counts, in panel column order.
    pub null_counts: Vec<ColumnNullCount>,
}

impl PanelSummary {
    /// Columns that still carry at least one null.
    pub fn columns_with_nulls(&self) -> impl Iterator<Item = &ColumnNullCount> {
        self.null_counts.iter().filter(|c| c.nulls > 0)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nPanel Summary\n");
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("  Rows:     {}\n", self.rows));
        output.push_str(&format!("  Regions:  {}\n", self.regions));
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => {
                output.push_str(&format!("  Period:   {start} to {end}\n"));
            }
            _ => output.push_str("  Period:   (no dated rows)\n"),
        }

        let gappy: Vec<&ColumnNullCount> = self.columns_with_nulls().collect();
        if gappy.is_empty() {
            output.push_str("  No remaining nulls.\n");
        } else {
            output.push_str("\nColumns with nulls:\n");
            output.push_str(&"-".repeat(60));
            output.push('\n');
            output.push_str(&format!("{:<42} {:>8} {:>8}\n", "Column", "Nulls", "%"));
            output.push_str(&"-".repeat(60));
            output.push('\n');
            for entry in gappy {
                let pct = if self.rows == 0 {
                    0.0
                } else {
                    entry.nulls as f64 / self.rows as f64 * 100.0
                };
                output.push_str(&format!(
                    "{:<42} {:>8} {:>7.1}%\n",
                    entry.column, entry.nulls, pct
                ));
            }
        }

        output.push_str(&"=".repeat(60));
        output.push('\n');
        output
    }
}

impl fmt::Display for PanelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows across {} regions", self.rows, self.regions)?;
        if let (Some(start), Some(end)) = (self.period_start, self.period_end) {
            write!(f, ", {start} to {end}")?;
        }
        Ok(())
    }
}

fn date_bound(df: &DataFrame, min: bool) -> Result<Option<NaiveDate>> {
    let expr = if min {
        col(DATE_COLUMN).min()
    } else {
        col(DATE_COLUMN).max()
    };
    let bound = df
        .clone()
        .lazy()
        .select([expr.cast(DataType::String).alias("bound")])
        .collect()?;
    let bound = bound.column("bound")?.str()?.get(0).map(|s| s.to_string());
    match bound {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| OutputError::Malformed(format!("unparsable date bound {text}: {e}"))),
        None => Ok(None),
    }
}

/// Summarize a panel frame.
///
/// # Errors
///
/// Fails when the frame lacks the `Date` or `RegionName` columns.
pub fn summarize_panel(df: &DataFrame) -> Result<PanelSummary> {
    for required in [DATE_COLUMN, REGION_NAME_COLUMN] {
        if df.column(required).is_err() {
            return Err(OutputError::MissingColumn(required.to_string()));
        }
    }

    let regions = df
        .clone()
        .lazy()
        .group_by([col(REGION_NAME_COLUMN)])
        .agg([len().alias("n_rows")])
        .collect()?
        .height();

    let null_counts = df
        .get_columns()
        .iter()
        .map(|column| ColumnNullCount {
            column: column.name().to_string(),
            nulls: column.null_count(),
        })
        .collect();

    Ok(PanelSummary {
        rows: df.height(),
        regions,
        period_start: date_bound(df, true)?,
        period_end: date_bound(df, false)?,
        null_counts,
    })
}
