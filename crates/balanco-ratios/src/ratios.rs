//! Liquidity, margin, return, activity and capital structure indicators.

use crate::calculator::{Calculator, ConfigurableCalculator};
use crate::indicator::{Indicator, IndicatorSet, IndicatorValue, Model};
use crate::period::{ClosingBalances, PeriodState, average};
use crate::statements::AccountSums;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the [`RatioCalculator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioConfig {
    /// Days per period for the activity indicators (default: 365)
    pub days_in_year: f64,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            days_in_year: 365.0,
        }
    }
}

/// Computes the standard indicator set for one fiscal year.
#[derive(Debug, Clone, Default)]
pub struct RatioCalculator {
    config: RatioConfig,
}

impl RatioCalculator {
    /// Create a calculator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Calculator for RatioCalculator {
    fn name(&self) -> &str {
        "ratios"
    }

    fn model(&self) -> Model {
        Model::Ratios
    }

    fn compute(&self, s: &AccountSums, prior: &PeriodState) -> (IndicatorSet, PeriodState) {
        let days = self.config.days_in_year;
        let previous = prior.previous_for(s.fiscal_year);

        let avg_equity = average(previous.map(|p| p.equity), s.equity);
        let avg_inventory = average(previous.map(|p| p.inventory), s.inventory);
        let avg_receivables = average(previous.map(|p| p.receivables), s.receivables);
        let avg_payables = average(previous.map(|p| p.payables), s.suppliers);

        let mut set = IndicatorSet::new();

        // Liquidity
        set.insert(
            Indicator::CurrentRatio,
            IndicatorValue::ratio(s.current_assets, s.current_liabilities),
        );
        set.insert(
            Indicator::CashRatio,
            IndicatorValue::ratio(s.cash, s.current_liabilities),
        );
        set.insert(
            Indicator::QuickRatio,
            IndicatorValue::ratio(s.current_assets - s.inventory, s.current_liabilities),
        );

        // Results and margins
        let gross_profit = s.revenue + s.cost_of_goods_sold;
        let ebit = gross_profit - s.operating_expenses;
        let ebitda = ebit - s.depreciation;
        set.insert(Indicator::Ebit, ebit);
        set.insert(Indicator::Ebitda, ebitda);
        set.insert(
            Indicator::GrossMargin,
            IndicatorValue::margin(gross_profit, s.revenue),
        );
        set.insert(Indicator::EbitMargin, IndicatorValue::margin(ebit, s.revenue));
        set.insert(
            Indicator::NetMargin,
            IndicatorValue::margin(s.net_income, s.revenue),
        );
        set.insert(
            Indicator::ReturnOnEquity,
            IndicatorValue::ratio(s.net_income, avg_equity) * 100.0,
        );

        // Activity
        let cost = s.cost_of_goods_sold.abs();
        let days_inventory = IndicatorValue::ratio(avg_inventory, cost) * days;
        let days_receivables = IndicatorValue::ratio(avg_receivables, s.revenue) * days;
        let purchases = match previous {
            Some(p) => s.inventory - p.inventory + cost,
            None => cost,
        };
        let days_payables =
            IndicatorValue::ratio(avg_payables, purchases).map(|ratio| (ratio * days).abs());
        let operating_cycle = days_inventory + days_receivables;

        set.insert(Indicator::DaysInventory, days_inventory);
        set.insert(Indicator::DaysReceivables, days_receivables);
        set.insert(Indicator::Purchases, purchases);
        set.insert(Indicator::DaysPayables, days_payables);
        set.insert(Indicator::OperatingCycle, operating_cycle);
        set.insert(
            Indicator::CashConversionCycle,
            operating_cycle - days_payables,
        );

        // Capital structure
        let total_liabilities = s.total_liabilities();
        set.insert(
            Indicator::EquityComposition,
            IndicatorValue::ratio(s.equity, s.total_liabilities_and_equity) * 100.0,
        );
        set.insert(
            Indicator::ThirdPartyComposition,
            IndicatorValue::ratio(total_liabilities, s.total_liabilities_and_equity) * 100.0,
        );
        set.insert(Indicator::Equity, s.equity);
        set.insert(Indicator::ThirdPartyCapital, total_liabilities);
        set.insert(
            Indicator::NetDebtToEbitda,
            IndicatorValue::ratio(s.gross_debt - s.cash, ebitda),
        );
        set.insert(
            Indicator::InterestCoverage,
            IndicatorValue::ratio(ebit, s.financial_expenses.abs()),
        );
        set.insert(
            Indicator::Indebtedness,
            IndicatorValue::ratio(total_liabilities, s.total_assets) * 100.0,
        );
        set.insert(
            Indicator::DebtProfile,
            IndicatorValue::ratio(s.current_liabilities, total_liabilities) * 100.0,
        );

        debug!(
            year = s.fiscal_year,
            averaged = previous.is_some(),
            "computed ratios"
        );

        (set, PeriodState::Closed(ClosingBalances::from_sums(s)))
    }
}

impl ConfigurableCalculator for RatioCalculator {
    type Config = RatioConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
