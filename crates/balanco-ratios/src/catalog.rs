//! Account categories and the catalog of patterns that recognize them.
//!
//! Filers describe the same account in slightly different words from one
//! release to the next. A category is therefore recognized by an ordered list
//! of candidate patterns, tried in turn, and by account codes used only when
//! no candidate matches anything.
//!
//! Patterns are compared against normalized descriptions (see
//! [`normalize_label`](crate::matcher::normalize_label)). `Text` patterns are
//! normalized the same way before comparison; `Regex` patterns must be
//! written in normalized form (lowercase, no accents, no whitespace).

use crate::error::Result;
use balanco_data::StatementKind;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Semantic account category.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Total current assets
    #[display("current_assets")]
    CurrentAssets,
    /// Cash and cash equivalents
    #[display("cash")]
    Cash,
    /// Inventories
    #[display("inventory")]
    Inventory,
    /// Trade receivables
    #[display("receivables")]
    Receivables,
    /// Total assets
    #[display("total_assets")]
    TotalAssets,
    /// Total current liabilities
    #[display("current_liabilities")]
    CurrentLiabilities,
    /// Total non-current liabilities
    #[display("non_current_liabilities")]
    NonCurrentLiabilities,
    /// Shareholders' equity
    #[display("equity")]
    Equity,
    /// Trade payables to suppliers
    #[display("suppliers")]
    Suppliers,
    /// Loans and financing, current and non-current
    #[display("gross_debt")]
    GrossDebt,
    /// Total liabilities plus equity
    #[display("total_liabilities_and_equity")]
    TotalLiabilitiesAndEquity,
    /// Net revenue from goods and services
    #[display("net_revenue")]
    NetRevenue,
    /// Cost of goods and services sold (filed negative)
    #[display("cost_of_goods_sold")]
    CostOfGoodsSold,
    /// Operating expenses and income total (filed negative when a net expense)
    #[display("operating_expenses")]
    OperatingExpenses,
    /// Depreciation and amortization
    #[display("depreciation")]
    Depreciation,
    /// Financial expenses (filed negative)
    #[display("financial_expenses")]
    FinancialExpenses,
    /// Net income for the period
    #[display("net_income")]
    NetIncome,
}

impl Category {
    /// Every category, in catalog order.
    pub const ALL: [Self; 17] = [
        Self::CurrentAssets,
        Self::Cash,
        Self::Inventory,
        Self::Receivables,
        Self::TotalAssets,
        Self::CurrentLiabilities,
        Self::NonCurrentLiabilities,
        Self::Equity,
        Self::Suppliers,
        Self::GrossDebt,
        Self::TotalLiabilitiesAndEquity,
        Self::NetRevenue,
        Self::CostOfGoodsSold,
        Self::OperatingExpenses,
        Self::Depreciation,
        Self::FinancialExpenses,
        Self::NetIncome,
    ];

    /// Statement the category is read from.
    pub const fn statement(&self) -> StatementKind {
        match self {
            Self::CurrentAssets
            | Self::Cash
            | Self::Inventory
            | Self::Receivables
            | Self::TotalAssets => StatementKind::AssetsBalance,
            Self::CurrentLiabilities
            | Self::NonCurrentLiabilities
            | Self::Equity
            | Self::Suppliers
            | Self::GrossDebt
            | Self::TotalLiabilitiesAndEquity => StatementKind::LiabilitiesBalance,
            Self::NetRevenue
            | Self::CostOfGoodsSold
            | Self::OperatingExpenses
            | Self::Depreciation
            | Self::FinancialExpenses
            | Self::NetIncome => StatementKind::IncomeStatement,
        }
    }
}

/// A predicate over account descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Normalized substring containment
    Text(String),
    /// Matches when any alternative is contained
    AnyOf(Vec<String>),
    /// Regular expression over the normalized description
    Regex(String),
}

impl Pattern {
    /// Substring pattern.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Pattern matching any of several substrings.
    pub fn any_of<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyOf(alternatives.into_iter().map(Into::into).collect())
    }

    /// Regular-expression pattern, written in normalized form.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex(pattern.into())
    }
}

/// How one category is recognized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Patterns in priority order; the first one matching anything wins
    #[serde(default)]
    pub candidates: Vec<Pattern>,
    /// Account codes tried in order when no candidate matches
    #[serde(default)]
    pub fallback_codes: Vec<String>,
}

impl CategoryRule {
    /// Create a rule from candidates and fallback codes.
    pub fn new<C>(candidates: Vec<Pattern>, fallback_codes: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            candidates,
            fallback_codes: fallback_codes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Rules for every category.
///
/// The default catalog targets the CVM standardized chart of accounts. A
/// catalog read from JSON overrides only the categories it names:
///
/// ```json
/// {
///   "suppliers": {
///     "candidates": [{ "text": "Fornecedores" }],
///     "fallback_codes": ["2.01.02"]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountCatalog {
    rules: BTreeMap<Category, CategoryRule>,
}

impl Default for AccountCatalog {
    fn default() -> Self {
        Self::cvm()
    }
}

impl AccountCatalog {
    /// A catalog with no rules; every category resolves to 0.
    pub const fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Built-in catalog for CVM standardized statements.
    pub fn cvm() -> Self {
        use Pattern as P;

        let rules = [
            (
                Category::CurrentAssets,
                CategoryRule::new(
                    vec![P::regex("^ativocirculante$"), P::text("Ativo Circulante")],
                    ["1.01"],
                ),
            ),
            (
                Category::Cash,
                CategoryRule::new(
                    vec![
                        P::regex("^caixaeequivalentesdecaixa$"),
                        P::text("Caixa e Equivalentes"),
                    ],
                    ["1.01.01"],
                ),
            ),
            (
                Category::Inventory,
                CategoryRule::new(
                    vec![P::regex("^estoques?$"), P::text("Estoque")],
                    ["1.01.04"],
                ),
            ),
            (
                Category::Receivables,
                CategoryRule::new(
                    vec![
                        P::regex("^contasareceber$"),
                        P::any_of(["Contas a Receber", "Clientes"]),
                    ],
                    ["1.01.03"],
                ),
            ),
            (
                Category::TotalAssets,
                CategoryRule::new(vec![P::regex("^ativototal$")], ["1"]),
            ),
            (
                Category::CurrentLiabilities,
                CategoryRule::new(
                    vec![P::regex("^passivocirculante$"), P::text("Passivo Circulante")],
                    ["2.01"],
                ),
            ),
            (
                Category::NonCurrentLiabilities,
                CategoryRule::new(
                    vec![
                        P::regex("^passivonaocirculante$"),
                        P::text("Passivo Não Circulante"),
                    ],
                    ["2.02"],
                ),
            ),
            (
                Category::Equity,
                CategoryRule::new(
                    vec![
                        P::text("Patrimônio Líquido Consolidado"),
                        P::regex("^patrimonioliquido$"),
                    ],
                    ["2.03"],
                ),
            ),
            (
                Category::Suppliers,
                CategoryRule::new(
                    vec![P::regex("^fornecedores$"), P::text("Fornecedores")],
                    ["2.01.02"],
                ),
            ),
            (
                Category::GrossDebt,
                CategoryRule::new(
                    vec![
                        P::regex("^emprestimosefinanciamentos$"),
                        P::text("Empréstimos e Financiamentos"),
                    ],
                    ["2.01.04"],
                ),
            ),
            (
                Category::TotalLiabilitiesAndEquity,
                CategoryRule::new(vec![P::regex("^passivototal$")], ["2"]),
            ),
            (
                Category::NetRevenue,
                CategoryRule::new(
                    vec![P::text("Receita de Venda de Bens e/ou Serviços")],
                    ["3.01"],
                ),
            ),
            (
                Category::CostOfGoodsSold,
                CategoryRule::new(
                    vec![
                        P::text("Custo dos Bens e/ou Serviços Vendidos"),
                        P::regex("custodos(bens|servicos)"),
                    ],
                    ["3.02"],
                ),
            ),
            (
                Category::OperatingExpenses,
                CategoryRule::new(
                    vec![P::regex("^despesas/receitasoperacionais$")],
                    ["3.04"],
                ),
            ),
            (
                Category::Depreciation,
                CategoryRule::new(vec![P::any_of(["Deprecia", "Amortiza"])], Vec::<String>::new()),
            ),
            (
                Category::FinancialExpenses,
                CategoryRule::new(
                    vec![P::regex("^despesasfinanceiras$"), P::text("Despesas Financeiras")],
                    ["3.06.02"],
                ),
            ),
            (
                Category::NetIncome,
                CategoryRule::new(
                    vec![
                        P::regex("^lucro/prejuizoconsolidadodoperiodo$"),
                        P::regex("^lucro/prejuizodoperiodo$"),
                    ],
                    ["3.11"],
                ),
            ),
        ];

        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Parse a catalog from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a catalog from a JSON file and lay it over the built-in one.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::cvm().merged(Self::from_json_str(&json)?))
    }

    /// Serialize the catalog as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rule for a category, if configured.
    pub fn rule(&self, category: Category) -> Option<&CategoryRule> {
        self.rules.get(&category)
    }

    /// Replace the rule for a category.
    pub fn set_rule(&mut self, category: Category, rule: CategoryRule) {
        self.rules.insert(category, rule);
    }

    /// Builder-style variant of [`set_rule`](Self::set_rule).
    pub fn with_rule(mut self, category: Category, rule: CategoryRule) -> Self {
        self.set_rule(category, rule);
        self
    }

    /// Categories of `overrides` replace those of `self`.
    pub fn merged(mut self, overrides: Self) -> Self {
        self.rules.extend(overrides.rules);
        self
    }

    /// Iterate over configured rules in category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryRule)> {
        self.rules.iter().map(|(category, rule)| (*category, rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cvm_catalog_covers_every_category() {
        let catalog = AccountCatalog::cvm();
        for category in Category::ALL {
            assert!(catalog.rule(category).is_some(), "{category} missing");
        }
    }

    #[test]
    fn test_supplier_fallback_code() {
        let catalog = AccountCatalog::cvm();
        let rule = catalog.rule(Category::Suppliers).unwrap();
        assert_eq!(rule.fallback_codes, vec!["2.01.02".to_string()]);
    }

    #[test]
    fn test_json_overrides_only_named_categories() {
        let overrides = AccountCatalog::from_json_str(
            r#"{ "inventory": { "candidates": [{ "text": "Ativos Biológicos" }] } }"#,
        )
        .unwrap();
        let catalog = AccountCatalog::cvm().merged(overrides);

        let inventory = catalog.rule(Category::Inventory).unwrap();
        assert_eq!(inventory.candidates, vec![Pattern::text("Ativos Biológicos")]);
        assert!(inventory.fallback_codes.is_empty());
        assert_eq!(
            catalog.rule(Category::Cash),
            AccountCatalog::cvm().rule(Category::Cash)
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let catalog = AccountCatalog::cvm();
        let json = catalog.to_json_pretty().unwrap();
        assert_eq!(AccountCatalog::from_json_str(&json).unwrap(), catalog);
    }

    #[test]
    fn test_statement_of_category() {
        assert_eq!(Category::Suppliers.statement(), StatementKind::LiabilitiesBalance);
        assert_eq!(Category::Depreciation.statement(), StatementKind::IncomeStatement);
        assert_eq!(Category::Cash.statement(), StatementKind::AssetsBalance);
    }
}
