//! Indicator Registry
//!
//! Central registry for every indicator the engine produces. Used for
//! lookups by name, column headers and listings.

use crate::indicator::{Indicator, Model, Precision};

/// Available indicator categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorCategory {
    /// Liquidity ratios (current, cash, quick)
    Liquidity,
    /// Results, margins and returns
    Profitability,
    /// Activity and cycle metrics in days
    Activity,
    /// Capital structure and indebtedness
    CapitalStructure,
    /// DuPont decomposition factors
    Dupont,
}

/// Indicator metadata
#[derive(Debug, Clone)]
pub struct IndicatorInfo {
    /// Indicator
    pub indicator: Indicator,
    /// Machine name (unique identifier)
    pub name: &'static str,
    /// Short display label
    pub label: &'static str,
    /// Model that produces the indicator
    pub model: Model,
    /// Indicator category
    pub category: IndicatorCategory,
    /// Brief description of what the indicator measures
    pub description: &'static str,
    /// Rounding class
    pub precision: Precision,
}

fn info(
    indicator: Indicator,
    label: &'static str,
    category: IndicatorCategory,
    description: &'static str,
) -> IndicatorInfo {
    IndicatorInfo {
        indicator,
        name: indicator.name(),
        label,
        model: indicator.model(),
        category,
        description,
        precision: indicator.precision(),
    }
}

/// Get all available indicator info, in presentation order
pub fn available_indicators() -> Vec<IndicatorInfo> {
    use IndicatorCategory::*;
    use Indicator as I;

    vec![
        // Liquidity
        info(I::CurrentRatio, "Current ratio", Liquidity, "Current assets over current liabilities"),
        info(I::CashRatio, "Cash ratio", Liquidity, "Cash and equivalents over current liabilities"),
        info(I::QuickRatio, "Quick ratio", Liquidity, "Current assets less inventory over current liabilities"),
        // Profitability
        info(I::Ebit, "EBIT", Profitability, "Net revenue plus cost of sales less operating expenses"),
        info(I::Ebitda, "EBITDA", Profitability, "EBIT less depreciation and amortization as filed"),
        info(I::GrossMargin, "Gross margin %", Profitability, "Gross profit over net revenue"),
        info(I::EbitMargin, "EBIT margin %", Profitability, "EBIT over net revenue"),
        info(I::NetMargin, "Net margin %", Profitability, "Net income over net revenue"),
        info(I::ReturnOnEquity, "ROE %", Profitability, "Net income over average equity"),
        // Activity
        info(I::DaysInventory, "Days inventory (PMRE)", Activity, "Average inventory over cost of sales, in days"),
        info(I::DaysReceivables, "Days receivables (PMRV)", Activity, "Average receivables over net revenue, in days"),
        info(I::Purchases, "Purchases", Activity, "Change in inventory plus cost of sales"),
        info(I::DaysPayables, "Days payables (PMPF)", Activity, "Average payables over purchases, in days"),
        info(I::OperatingCycle, "Operating cycle", Activity, "Days inventory plus days receivables"),
        info(I::CashConversionCycle, "Cash conversion cycle", Activity, "Operating cycle less days payables"),
        // Capital structure
        info(I::EquityComposition, "Equity composition %", CapitalStructure, "Equity over total liabilities and equity"),
        info(I::ThirdPartyComposition, "Third-party composition %", CapitalStructure, "Total liabilities over total liabilities and equity"),
        info(I::Equity, "Equity", CapitalStructure, "Closing shareholders' equity"),
        info(I::ThirdPartyCapital, "Third-party capital", CapitalStructure, "Closing current plus non-current liabilities"),
        info(I::NetDebtToEbitda, "Net debt / EBITDA", CapitalStructure, "Gross financial debt less cash over EBITDA"),
        info(I::InterestCoverage, "Interest coverage", CapitalStructure, "EBIT over financial expenses"),
        info(I::Indebtedness, "Indebtedness %", CapitalStructure, "Total liabilities over total assets"),
        info(I::DebtProfile, "Debt profile %", CapitalStructure, "Current liabilities over total liabilities"),
        // Traditional DuPont
        info(I::TraditionalNetMargin, "Net margin %", Dupont, "Net income over net revenue"),
        info(I::AssetTurnover, "Asset turnover", Dupont, "Net revenue over average total assets"),
        info(I::NaiveReturnOnAssets, "ROA %", Dupont, "Net margin times asset turnover"),
        info(I::FinancialLeverage, "Financial leverage", Dupont, "Average total assets over average equity"),
        info(I::TraditionalReturnOnEquity, "ROE %", Dupont, "ROA times financial leverage"),
        // Adjusted DuPont
        info(I::IncomeOnAssets, "Income on assets", Dupont, "Net income plus after-tax financial expense"),
        info(I::NetAssets, "Net assets", Dupont, "Closing equity plus gross financial debt"),
        info(I::AfterTaxFinancialExpense, "After-tax financial expense", Dupont, "Financial expense net of statutory income tax"),
        info(I::AdjustedNetMargin, "Adjusted net margin %", Dupont, "Income on assets over net revenue"),
        info(I::NetAssetTurnover, "Net asset turnover", Dupont, "Net revenue over average net assets"),
        info(I::ReturnOnInvestedCapital, "ROIC %", Dupont, "Income on assets over average net assets"),
        info(I::CostOfDebt, "Cost of debt %", Dupont, "After-tax financial expense over average gross debt"),
        info(I::Spread, "Spread", Dupont, "ROIC less cost of debt"),
        info(I::DebtLeverage, "Debt leverage %", Dupont, "Average gross debt over average equity"),
        info(I::LeverageContribution, "Leverage contribution", Dupont, "Spread times debt leverage"),
        info(I::AdjustedReturnOnEquity, "ROE %", Dupont, "ROIC plus leverage contribution"),
    ]
}

/// Get indicators by category
pub fn indicators_by_category(category: IndicatorCategory) -> Vec<IndicatorInfo> {
    available_indicators()
        .into_iter()
        .filter(|i| i.category == category)
        .collect()
}

/// Get indicators produced by a model
pub fn indicators_by_model(model: Model) -> Vec<IndicatorInfo> {
    available_indicators()
        .into_iter()
        .filter(|i| i.model == model)
        .collect()
}

/// Get indicator info by machine name
pub fn get_indicator_info(name: &str) -> Option<IndicatorInfo> {
    available_indicators().into_iter().find(|i| i.name == name)
}

/// Metadata of an indicator
pub fn info_of(indicator: Indicator) -> Option<IndicatorInfo> {
    available_indicators()
        .into_iter()
        .find(|i| i.indicator == indicator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_matches_vocabulary() {
        let infos = available_indicators();
        assert_eq!(infos.len(), Indicator::ALL.len());
        for (info, indicator) in infos.iter().zip(Indicator::ALL) {
            assert_eq!(info.indicator, *indicator);
        }
    }

    #[test]
    fn test_indicators_by_model() {
        assert_eq!(indicators_by_model(Model::Ratios).len(), 23);
        assert_eq!(indicators_by_model(Model::TraditionalDupont).len(), 5);
        assert_eq!(indicators_by_model(Model::AdjustedDupont).len(), 11);
    }

    #[test]
    fn test_indicators_by_category() {
        assert_eq!(indicators_by_category(IndicatorCategory::Liquidity).len(), 3);
        assert_eq!(indicators_by_category(IndicatorCategory::Profitability).len(), 6);
        assert_eq!(indicators_by_category(IndicatorCategory::Activity).len(), 6);
        assert_eq!(indicators_by_category(IndicatorCategory::CapitalStructure).len(), 8);
        assert_eq!(indicators_by_category(IndicatorCategory::Dupont).len(), 16);
    }

    #[test]
    fn test_get_indicator_info() {
        let info = get_indicator_info("days_payables").unwrap();
        assert_eq!(info.indicator, Indicator::DaysPayables);
        assert_eq!(info.precision, Precision::Days);
        assert!(get_indicator_info("nonexistent").is_none());
        assert_eq!(info_of(Indicator::Spread).unwrap().name, "spread");
    }
}
