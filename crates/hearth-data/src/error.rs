//! Error types for pipeline stages.

use thiserror::Error;

/// Result type for pipeline stages.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while building the panel.
#[derive(Debug, Error)]
pub enum DataError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A wide source table carries no date columns to unpivot
    #[error("Source {indicator} has no date columns beyond the region key")]
    NoDateColumns {
        /// Indicator whose table was malformed
        indicator: String,
    },

    /// The housing-starts file is unreadable or malformed; this aborts the run
    #[error("Housing starts file {path}: {reason}")]
    StartsFile {
        /// Path that failed
        path: String,
        /// What went wrong
        reason: String,
    },

    /// A column required by the stage is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// The merger was handed no long tables at all
    #[error("No source tables were loaded; nothing to merge")]
    NoSources,
}
