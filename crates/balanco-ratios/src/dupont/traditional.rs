//! Three-factor DuPont decomposition.

use crate::calculator::Calculator;
use crate::indicator::{Indicator, IndicatorSet, IndicatorValue, Model};
use crate::period::{ClosingBalances, PeriodState, average};
use crate::statements::AccountSums;

/// ROE = net margin x asset turnover x financial leverage, on average
/// assets and average equity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraditionalDupont;

impl TraditionalDupont {
    /// Create the calculator.
    pub const fn new() -> Self {
        Self
    }
}

impl Calculator for TraditionalDupont {
    fn name(&self) -> &str {
        "traditional_dupont"
    }

    fn model(&self) -> Model {
        Model::TraditionalDupont
    }

    fn compute(&self, s: &AccountSums, prior: &PeriodState) -> (IndicatorSet, PeriodState) {
        let previous = prior.previous_for(s.fiscal_year);
        let avg_assets = average(previous.map(|p| p.total_assets), s.total_assets);
        let avg_equity = average(previous.map(|p| p.equity), s.equity);

        let net_margin = IndicatorValue::margin(s.net_income, s.revenue);
        let asset_turnover = IndicatorValue::ratio(s.revenue, avg_assets);
        // a zero-revenue margin is 0, which would drop net income from ROA
        let naive_roa = if s.revenue == 0.0 {
            IndicatorValue::ratio(s.net_income, avg_assets) * 100.0
        } else {
            net_margin * asset_turnover
        };
        let leverage = IndicatorValue::ratio(avg_assets, avg_equity);

        let mut set = IndicatorSet::new();
        set.insert(Indicator::TraditionalNetMargin, net_margin);
        set.insert(Indicator::AssetTurnover, asset_turnover);
        set.insert(Indicator::NaiveReturnOnAssets, naive_roa);
        set.insert(Indicator::FinancialLeverage, leverage);
        set.insert(Indicator::TraditionalReturnOnEquity, naive_roa * leverage);

        (set, PeriodState::Closed(ClosingBalances::from_sums(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::RatioCalculator;

    fn sums(fiscal_year: i32, total_assets: f64, equity: f64) -> AccountSums {
        AccountSums {
            fiscal_year,
            total_assets,
            equity,
            revenue: 2000.0,
            net_income: 200.0,
            ..AccountSums::default()
        }
    }

    #[test]
    fn test_factors_first_year() {
        let (set, _) = TraditionalDupont::new().compute(&sums(2020, 4000.0, 1000.0), &PeriodState::Absent);

        assert_eq!(set.finite(Indicator::TraditionalNetMargin), Some(10.0));
        assert_eq!(set.finite(Indicator::AssetTurnover), Some(0.5));
        assert_eq!(set.finite(Indicator::NaiveReturnOnAssets), Some(5.0));
        assert_eq!(set.finite(Indicator::FinancialLeverage), Some(4.0));
        assert_eq!(set.finite(Indicator::TraditionalReturnOnEquity), Some(20.0));
    }

    #[test]
    fn test_averages_assets_and_equity() {
        let calculator = TraditionalDupont::new();
        let (_, state) = calculator.compute(&sums(2020, 3000.0, 600.0), &PeriodState::Absent);
        let (set, _) = calculator.compute(&sums(2021, 5000.0, 1400.0), &state);

        // average assets 4000, average equity 1000
        assert_eq!(set.finite(Indicator::AssetTurnover), Some(0.5));
        assert_eq!(set.finite(Indicator::FinancialLeverage), Some(4.0));
        assert_eq!(set.finite(Indicator::TraditionalReturnOnEquity), Some(20.0));
    }

    #[test]
    fn test_zero_equity_is_unbounded() {
        let (set, _) = TraditionalDupont::new().compute(&sums(2020, 4000.0, 0.0), &PeriodState::Absent);
        assert!(set.get(Indicator::FinancialLeverage).unwrap().is_unbounded());
        assert!(set.get(Indicator::TraditionalReturnOnEquity).unwrap().is_unbounded());
    }

    #[test]
    fn test_zero_revenue_margin_is_zero() {
        let mut input = sums(2020, 4000.0, 1000.0);
        input.revenue = 0.0;
        let (set, _) = TraditionalDupont::new().compute(&input, &PeriodState::Absent);

        assert_eq!(set.finite(Indicator::TraditionalNetMargin), Some(0.0));
        assert_eq!(set.finite(Indicator::AssetTurnover), Some(0.0));
    }

    #[test]
    fn test_zero_revenue_keeps_net_income_in_roe() {
        let mut input = sums(2020, 2000.0, 1000.0);
        input.revenue = 0.0;
        input.net_income = 100.0;
        let (set, _) = TraditionalDupont::new().compute(&input, &PeriodState::Absent);
        let (ratios, _) = RatioCalculator::new().compute(&input, &PeriodState::Absent);

        assert_eq!(set.finite(Indicator::TraditionalNetMargin), Some(0.0));
        assert_eq!(set.finite(Indicator::NaiveReturnOnAssets), Some(5.0));
        assert_eq!(set.finite(Indicator::TraditionalReturnOnEquity), Some(10.0));
        assert_eq!(
            set.get(Indicator::TraditionalReturnOnEquity),
            ratios.get(Indicator::ReturnOnEquity)
        );
    }
}
