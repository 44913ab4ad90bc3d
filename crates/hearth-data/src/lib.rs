#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/hearthdata/hearth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fill;
pub mod merge;
pub mod reshape;
pub mod sources;

pub use error::{DataError, Result};
pub use fill::fill_gaps;
pub use merge::{
    StartsJoinDiagnostics, drop_unresolved_dates, ensure_indicator_columns, join_housing_starts,
    merge_long_tables,
};
pub use reshape::wide_to_long;
pub use sources::{load_housing_starts, load_source};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
