//! Integration glue between the pipeline crates and the CLI.

pub(crate) mod panel_pipeline;
