//! Adjusted (economic) DuPont decomposition.
//!
//! Separates the return produced by the assets from the effect of financing
//! them with debt:
//!
//! ```text
//! income on assets = net income - after-tax financial expense
//! ROIC             = income on assets / average net assets
//! cost of debt     = |after-tax financial expense / average gross debt|
//! ROE              = ROIC + (ROIC - cost of debt) x average gross debt / average equity
//! ```
//!
//! Net assets are equity plus gross financial debt. Financial expense is
//! non-positive, so subtracting its after-tax amount adds the interest back.
//!
//! The leverage contribution is evaluated as
//! `(ROIC x average gross debt - |after-tax financial expense|) / average equity`.
//! With debt this equals `spread x leverage`; without debt it still charges
//! financial expense against equity, so ROE stays net income over equity.

use crate::calculator::{Calculator, ConfigurableCalculator};
use crate::indicator::{Indicator, IndicatorSet, IndicatorValue, Model};
use crate::period::{ClosingBalances, PeriodState, average};
use crate::statements::AccountSums;
use serde::{Deserialize, Serialize};

/// Configuration for the [`AdjustedDupont`] calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedDupontConfig {
    /// Statutory income tax rate applied to financial expense (default: 0.34)
    pub tax_rate: f64,
}

impl Default for AdjustedDupontConfig {
    fn default() -> Self {
        Self { tax_rate: 0.34 }
    }
}

/// Economic return-on-equity decomposition.
#[derive(Debug, Clone, Default)]
pub struct AdjustedDupont {
    config: AdjustedDupontConfig,
}

impl AdjustedDupont {
    /// Create the calculator with the default tax rate.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Calculator for AdjustedDupont {
    fn name(&self) -> &str {
        "adjusted_dupont"
    }

    fn model(&self) -> Model {
        Model::AdjustedDupont
    }

    fn compute(&self, s: &AccountSums, prior: &PeriodState) -> (IndicatorSet, PeriodState) {
        let previous = prior.previous_for(s.fiscal_year);
        let closing = ClosingBalances::from_sums(s);

        let avg_equity = average(previous.map(|p| p.equity), s.equity);
        let avg_debt = average(previous.map(|p| p.gross_debt), s.gross_debt);
        let avg_net_assets = average(previous.map(ClosingBalances::net_assets), closing.net_assets());

        let after_tax_expense = s.financial_expenses * (1.0 - self.config.tax_rate);
        let income_on_assets = s.net_income - after_tax_expense;

        let roic = IndicatorValue::ratio(income_on_assets, avg_net_assets) * 100.0;
        let cost_of_debt =
            IndicatorValue::ratio(after_tax_expense, avg_debt).map(|cost| (cost * 100.0).abs());
        let debt_leverage = IndicatorValue::ratio(avg_debt, avg_equity) * 100.0;
        let spread = roic - cost_of_debt;
        // spread x leverage / 100, expanded so it stays finite without debt
        let contribution = roic
            .map(|roic| (roic * avg_debt - after_tax_expense.abs() * 100.0) / avg_equity);

        let mut set = IndicatorSet::new();
        set.insert(Indicator::IncomeOnAssets, income_on_assets);
        set.insert(Indicator::NetAssets, closing.net_assets());
        set.insert(Indicator::AfterTaxFinancialExpense, after_tax_expense);
        set.insert(
            Indicator::AdjustedNetMargin,
            IndicatorValue::margin(income_on_assets, s.revenue),
        );
        set.insert(
            Indicator::NetAssetTurnover,
            IndicatorValue::ratio(s.revenue, avg_net_assets),
        );
        set.insert(Indicator::ReturnOnInvestedCapital, roic);
        set.insert(Indicator::CostOfDebt, cost_of_debt);
        set.insert(Indicator::Spread, spread);
        set.insert(Indicator::DebtLeverage, debt_leverage);
        set.insert(Indicator::LeverageContribution, contribution);
        set.insert(Indicator::AdjustedReturnOnEquity, roic + contribution);

        (set, PeriodState::Closed(closing))
    }
}

impl ConfigurableCalculator for AdjustedDupont {
    type Config = AdjustedDupontConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
