#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/balanco/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calculator;
pub mod catalog;
pub mod dupont;
pub mod error;
pub mod indicator;
pub mod matcher;
pub mod period;
pub mod ratios;
pub mod registry;
pub mod series;
pub mod statements;

pub use calculator::{Calculator, ConfigurableCalculator};
pub use catalog::{AccountCatalog, Category, CategoryRule, Pattern};
pub use dupont::{AdjustedDupont, AdjustedDupontConfig, TraditionalDupont};
pub use error::{RatioError, Result};
pub use indicator::{Indicator, IndicatorSet, IndicatorValue, Model, Precision};
pub use matcher::{AccountMatcher, PatternMatcher, match_sum, normalize_label};
pub use period::{ClosingBalances, PeriodState, average};
pub use ratios::{RatioCalculator, RatioConfig};
pub use registry::{
    IndicatorCategory, IndicatorInfo, available_indicators, get_indicator_info,
    indicators_by_category, indicators_by_model,
};
pub use series::{Analysis, Series, SeriesBuilder};
pub use statements::{AccountSums, FiscalStatements};

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
