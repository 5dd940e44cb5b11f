//! Glue between the command line and the library crates.
//!
//! Opens the on-disk cache, picks the row-set source the flags ask for and
//! drives the analysis with a progress bar.

pub(crate) mod cache_manager;
pub(crate) mod pipeline;
