#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/balanco/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod cvm;
pub mod error;
pub mod model;
pub mod source;

pub use cache::{CacheMode, CachedSource, SqliteCache};
pub use cvm::{ClientConfig, CvmClient};
pub use error::{DataError, Result};
pub use model::{FilingKind, LineItem, RowSet, RowSetKey, Scope, StatementKind};
pub use source::{MemorySource, RowSetSource};

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
