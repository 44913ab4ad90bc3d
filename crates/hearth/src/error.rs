//! Error types for core panel operations.

use thiserror::Error;

/// Result type for core panel operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while working with the panel schema.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// A column required by the operation is absent from the frame
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Scaler fitting failed
    #[error("Scaler error: {0}")]
    Scaler(String),

    /// No rows matched the requested region
    #[error("Region not found in panel: {0}")]
    RegionNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
