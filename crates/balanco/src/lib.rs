#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/balanco/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;

// Re-export main types from sub-crates
pub use balanco_data as data;
pub use balanco_output as output;
pub use balanco_ratios as ratios;

pub use analysis::{AnalysisConfig, AnalysisError, Analyzer, Result, YearOutcome, analyze};
pub use balanco_ratios::{Analysis, Indicator, IndicatorValue, Model, Series};

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
