#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/hearthdata/hearth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod panel;
pub mod scale;
pub mod scenario;

pub use error::{CoreError, Result};
pub use panel::{FEATURE_COLUMNS, REGION_KEY_COLUMNS, TARGET_COLUMN, with_derived_features};
pub use scale::StandardScaler;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
