#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/hearthdata/hearth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod summary;

pub use export::{OutputError, Result, read_panel, write_panel};
pub use summary::{ColumnNullCount, PanelSummary, summarize_panel};
