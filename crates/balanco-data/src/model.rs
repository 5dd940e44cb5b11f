//! Line items and row-sets as produced by a filing accessor.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Statement a row-set was read from.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementKind {
    /// Balance sheet, assets side (BPA)
    #[display("balance-sheet-assets")]
    AssetsBalance,
    /// Balance sheet, liabilities and equity side (BPP)
    #[display("balance-sheet-liabilities")]
    LiabilitiesBalance,
    /// Income statement (DRE)
    #[display("income-statement")]
    IncomeStatement,
}

impl StatementKind {
    /// All statements the ratio engine needs for one fiscal year.
    pub const ALL: [Self; 3] = [
        Self::AssetsBalance,
        Self::LiabilitiesBalance,
        Self::IncomeStatement,
    ];

    /// CVM file code for the statement.
    pub const fn cvm_code(&self) -> &'static str {
        match self {
            Self::AssetsBalance => "BPA",
            Self::LiabilitiesBalance => "BPP",
            Self::IncomeStatement => "DRE",
        }
    }

    /// Parse a CVM file code.
    pub fn from_cvm_code(code: &str) -> Option<Self> {
        match code {
            "BPA" => Some(Self::AssetsBalance),
            "BPP" => Some(Self::LiabilitiesBalance),
            "DRE" => Some(Self::IncomeStatement),
            _ => None,
        }
    }

    /// Whether the statement covers a period rather than a point in time.
    pub const fn is_flow(&self) -> bool {
        matches!(self, Self::IncomeStatement)
    }
}

/// Filing family on the CVM portal.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingKind {
    /// Standardized annual statements (DFP)
    #[default]
    #[display("DFP")]
    Annual,
    /// Quarterly information (ITR)
    #[display("ITR")]
    Quarterly,
}

impl FilingKind {
    /// Upper-case directory name on the portal.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Annual => "DFP",
            Self::Quarterly => "ITR",
        }
    }

    /// Lower-case prefix used in archive and file names.
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Annual => "dfp",
            Self::Quarterly => "itr",
        }
    }
}

/// Consolidation scope of the statements.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Consolidated group statements
    #[default]
    #[display("con")]
    Consolidated,
    /// Parent-company-only statements
    #[display("ind")]
    Individual,
}

impl Scope {
    /// Suffix used in CVM file names.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Consolidated => "con",
            Self::Individual => "ind",
        }
    }
}

/// One row of a filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Hierarchical account code (e.g. "2.01.02")
    pub account_code: String,
    /// Free-text account description as filed
    pub description: String,
    /// Reported amount; costs and expenses are negative
    pub value: f64,
}

impl LineItem {
    /// Create a new line item.
    pub fn new(account_code: impl Into<String>, description: impl Into<String>, value: f64) -> Self {
        Self {
            account_code: account_code.into(),
            description: description.into(),
            value,
        }
    }
}

/// Line items of one statement, for one company and one fiscal year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    items: Vec<LineItem>,
}

impl RowSet {
    /// Build a row-set, dropping zero-valued rows.
    pub fn new(items: Vec<LineItem>) -> Self {
        Self {
            items: items.into_iter().filter(|item| item.value != 0.0).collect(),
        }
    }

    /// Line items in filing order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the line items.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Number of line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the row-set has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<LineItem> for RowSet {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Identifies one row-set request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowSetKey {
    /// Company code with leading zeros removed
    pub company: String,
    /// Fiscal year
    pub year: i32,
    /// Statement
    pub statement: StatementKind,
    /// Filing family
    pub filing: FilingKind,
    /// Consolidation scope
    pub scope: Scope,
}

impl RowSetKey {
    /// Create a key, normalizing the company code.
    pub fn new(
        company: &str,
        year: i32,
        statement: StatementKind,
        filing: FilingKind,
        scope: Scope,
    ) -> Self {
        Self {
            company: normalize_company_code(company),
            year,
            statement,
            filing,
            scope,
        }
    }
}

/// Strip whitespace and leading zeros from a CVM company code.
///
/// # Example
/// ```
/// # use balanco_data::model::normalize_company_code;
/// assert_eq!(normalize_company_code("022470"), "22470");
/// assert_eq!(normalize_company_code(" 20036 "), "20036");
/// ```
pub fn normalize_company_code(code: &str) -> String {
    let trimmed = code.trim().trim_start_matches('0');
    if trimmed.is_empty() && !code.trim().is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_set_drops_zero_values() {
        let rows = RowSet::new(vec![
            LineItem::new("1.01", "Ativo Circulante", 1000.0),
            LineItem::new("1.01.04", "Estoques", 0.0),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.items()[0].account_code, "1.01");
    }

    #[test]
    fn test_statement_codes() {
        for statement in StatementKind::ALL {
            assert_eq!(
                StatementKind::from_cvm_code(statement.cvm_code()),
                Some(statement)
            );
        }
        assert!(StatementKind::IncomeStatement.is_flow());
        assert!(!StatementKind::AssetsBalance.is_flow());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(StatementKind::AssetsBalance.to_string(), "balance-sheet-assets");
        assert_eq!(FilingKind::Quarterly.to_string(), "ITR");
        assert_eq!(Scope::Individual.to_string(), "ind");
    }

    #[test]
    fn test_key_normalizes_company() {
        let key = RowSetKey::new(
            "022470",
            2021,
            StatementKind::IncomeStatement,
            FilingKind::Annual,
            Scope::Consolidated,
        );
        assert_eq!(key.company, "22470");
    }

    #[test]
    fn test_normalize_empty_code() {
        assert_eq!(normalize_company_code(""), "");
        assert_eq!(normalize_company_code("000"), "0");
    }
}
