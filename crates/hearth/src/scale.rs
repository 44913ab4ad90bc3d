//! Feature standardization.
//!
//! The regressors downstream are fit on standardized features, so the same
//! transform has to be applied at prediction time. [`StandardScaler`] is
//! fitted once on the panel, persisted as a JSON artifact next to the model
//! files, and re-loaded by any consumer before calling predict.

use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Per-column standardization: `(x - mean) / std`.
///
/// Uses the population standard deviation (ddof = 0). Columns with zero or
/// undefined variance keep a unit divisor so they pass through centered but
/// unscaled.
///
/// # Examples
///
/// ```
/// use hearth::StandardScaler;
/// use polars::prelude::*;
///
/// let df = df!("x" => &[1.0, 2.0, 3.0]).unwrap();
/// let scaler = StandardScaler::fit(&df, &["x"]).unwrap();
/// let scaled = scaler.transform(&df).unwrap();
///
/// let x = scaled.column("x").unwrap().f64().unwrap();
/// assert!((x.get(1).unwrap()).abs() < 1e-12); // mean row maps to 0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and standard deviations over `columns` of `df`.
    ///
    /// # Errors
    ///
    /// Fails when a column is absent or holds no non-null values.
    pub fn fit(df: &DataFrame, columns: &[&str]) -> Result<Self> {
        for column in columns {
            if df.column(column).is_err() {
                return Err(CoreError::MissingColumn((*column).to_string()));
            }
        }

        let mut exprs = Vec::with_capacity(columns.len() * 2);
        for column in columns {
            let as_f64 = col(*column).cast(DataType::Float64);
            exprs.push(as_f64.clone().mean().alias(format!("{column}__mean")));
            exprs.push(as_f64.std(0).alias(format!("{column}__std")));
        }
        let stats = df.clone().lazy().select(exprs).collect()?;

        let mut means = Vec::with_capacity(columns.len());
        let mut stds = Vec::with_capacity(columns.len());
        for column in columns {
            let mean = stats
                .column(&format!("{column}__mean"))?
                .f64()?
                .get(0)
                .ok_or_else(|| CoreError::Scaler(format!("no values in column {column}")))?;
            let std = stats
                .column(&format!("{column}__std"))?
                .f64()?
                .get(0)
                .unwrap_or(0.0);
            means.push(mean);
            stds.push(if std.is_finite() && std > 0.0 { std } else { 1.0 });
        }

        Ok(Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            means,
            stds,
        })
    }

    /// Apply the fitted transform, replacing each column in place.
    ///
    /// # Errors
    ///
    /// Fails when a fitted column is absent from `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        for column in &self.columns {
            if df.column(column).is_err() {
                return Err(CoreError::MissingColumn(column.clone()));
            }
        }

        let exprs: Vec<Expr> = self
            .columns
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(column, (&mean, &std))| {
                ((col(column.as_str()).cast(DataType::Float64) - lit(mean)) / lit(std))
                    .alias(column.as_str())
            })
            .collect();

        Ok(df.clone().lazy().with_columns(exprs).collect()?)
    }

    /// Columns the scaler was fitted on, in fit order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Persist as a JSON artifact.
    ///
    /// # Errors
    ///
    /// Fails on serialization or file-write errors.
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously persisted scaler.
    ///
    /// # Errors
    ///
    /// Fails on read or deserialization errors.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> DataFrame {
        df!(
            "a" => &[1.0, 2.0, 3.0, 4.0],
            "b" => &[10.0, 10.0, 10.0, 10.0],
        )
        .unwrap()
    }

    #[test]
    fn test_fit_transform_standardizes() {
        let df = sample();
        let scaler = StandardScaler::fit(&df, &["a"]).unwrap();
        let out = scaler.transform(&df).unwrap();

        let a = out.column("a").unwrap().f64().unwrap();
        let mean: f64 = (0..4).map(|i| a.get(i).unwrap()).sum::<f64>() / 4.0;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);

        // population std of [1,2,3,4] is sqrt(1.25)
        assert_relative_eq!(a.get(0).unwrap(), (1.0 - 2.5) / 1.25f64.sqrt());
    }

    #[test]
    fn test_constant_column_passes_through_centered() {
        let df = sample();
        let scaler = StandardScaler::fit(&df, &["b"]).unwrap();
        let out = scaler.transform(&df).unwrap();

        let b = out.column("b").unwrap().f64().unwrap();
        for i in 0..4 {
            assert_relative_eq!(b.get(i).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let df = sample();
        assert!(matches!(
            StandardScaler::fit(&df, &["a", "zzz"]),
            Err(CoreError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let df = sample();
        let scaler = StandardScaler::fit(&df, &["a", "b"]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        scaler.to_json_file(&path).unwrap();

        let restored = StandardScaler::from_json_file(&path).unwrap();
        assert_eq!(scaler, restored);
    }
}
