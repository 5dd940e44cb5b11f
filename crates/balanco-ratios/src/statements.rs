//! One fiscal year's statements and the account sums matched from them.

use crate::catalog::Category;
use crate::matcher::AccountMatcher;
use balanco_data::{RowSet, StatementKind};
use serde::{Deserialize, Serialize};

/// The three statements of one company for one fiscal year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiscalStatements {
    /// Fiscal year
    pub fiscal_year: i32,
    /// Balance sheet, assets side
    pub assets: RowSet,
    /// Balance sheet, liabilities and equity side
    pub liabilities: RowSet,
    /// Income statement
    pub income: RowSet,
}

impl FiscalStatements {
    /// Bundle the statements of a year.
    pub const fn new(fiscal_year: i32, assets: RowSet, liabilities: RowSet, income: RowSet) -> Self {
        Self {
            fiscal_year,
            assets,
            liabilities,
            income,
        }
    }

    /// Row-set of a statement.
    pub const fn rows(&self, statement: StatementKind) -> &RowSet {
        match statement {
            StatementKind::AssetsBalance => &self.assets,
            StatementKind::LiabilitiesBalance => &self.liabilities,
            StatementKind::IncomeStatement => &self.income,
        }
    }
}

/// Category sums for one fiscal year, in the engine's sign convention.
///
/// Amounts are as filed, except `operating_expenses`, which holds the
/// magnitude of a net operating expense (negated filed total), and
/// `financial_expenses`, which is forced non-positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSums {
    /// Fiscal year
    pub fiscal_year: i32,
    /// Total current assets
    pub current_assets: f64,
    /// Cash and equivalents
    pub cash: f64,
    /// Inventories
    pub inventory: f64,
    /// Trade receivables
    pub receivables: f64,
    /// Total assets
    pub total_assets: f64,
    /// Total current liabilities
    pub current_liabilities: f64,
    /// Total non-current liabilities
    pub non_current_liabilities: f64,
    /// Shareholders' equity
    pub equity: f64,
    /// Trade payables
    pub suppliers: f64,
    /// Loans and financing
    pub gross_debt: f64,
    /// Total liabilities plus equity
    pub total_liabilities_and_equity: f64,
    /// Net revenue
    pub revenue: f64,
    /// Cost of goods and services sold, negative as filed
    pub cost_of_goods_sold: f64,
    /// Net operating expenses, positive when an expense
    pub operating_expenses: f64,
    /// Depreciation and amortization as filed
    pub depreciation: f64,
    /// Financial expenses, never positive
    pub financial_expenses: f64,
    /// Net income
    pub net_income: f64,
}

impl AccountSums {
    /// Match every category of a fiscal year's statements.
    pub fn extract(matcher: &AccountMatcher, statements: &FiscalStatements) -> Self {
        let sum = |category: Category| matcher.resolve(category, statements.rows(category.statement()));

        Self {
            fiscal_year: statements.fiscal_year,
            current_assets: sum(Category::CurrentAssets),
            cash: sum(Category::Cash),
            inventory: sum(Category::Inventory),
            receivables: sum(Category::Receivables),
            total_assets: sum(Category::TotalAssets),
            current_liabilities: sum(Category::CurrentLiabilities),
            non_current_liabilities: sum(Category::NonCurrentLiabilities),
            equity: sum(Category::Equity),
            suppliers: sum(Category::Suppliers),
            gross_debt: sum(Category::GrossDebt),
            total_liabilities_and_equity: sum(Category::TotalLiabilitiesAndEquity),
            revenue: sum(Category::NetRevenue),
            cost_of_goods_sold: sum(Category::CostOfGoodsSold),
            operating_expenses: -sum(Category::OperatingExpenses),
            depreciation: sum(Category::Depreciation),
            financial_expenses: -sum(Category::FinancialExpenses).abs(),
            net_income: sum(Category::NetIncome),
        }
    }

    /// Current plus non-current liabilities.
    pub const fn total_liabilities(&self) -> f64 {
        self.current_liabilities + self.non_current_liabilities
    }
}
