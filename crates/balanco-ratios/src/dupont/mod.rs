//! Return-on-equity decompositions.
//!
//! - [`TraditionalDupont`]: net margin x asset turnover x financial leverage
//! - [`AdjustedDupont`]: return on invested capital plus the contribution of
//!   financial leverage, with after-tax financial expense separated from
//!   operating income
//!
//! For consistent inputs both reproduce the return on equity of the
//! [`RatioCalculator`](crate::ratios::RatioCalculator).

pub mod adjusted;
pub mod traditional;

pub use adjusted::{AdjustedDupont, AdjustedDupontConfig};
pub use traditional::TraditionalDupont;
