//! Account matching: classify line items and sum what matched.

use crate::catalog::{AccountCatalog, Category, CategoryRule, Pattern};
use crate::error::{RatioError, Result};
use balanco_data::RowSet;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Normalize an account description for matching.
///
/// Lowercases, folds Latin diacritics to their base letter and removes all
/// whitespace, so formatting drift between filing releases does not change
/// the outcome of a match.
///
/// # Example
/// ```
/// # use balanco_ratios::matcher::normalize_label;
/// assert_eq!(normalize_label("Patrimônio Líquido"), "patrimonioliquido");
/// assert_eq!(normalize_label("PatrimônioLíquido"), "patrimonioliquido");
/// ```
pub fn normalize_label(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !c.is_whitespace())
        .map(fold_diacritic)
        .collect()
}

const fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// A [`Pattern`] prepared for matching.
#[derive(Debug, Clone)]
pub enum PatternMatcher {
    /// Normalized substring
    Text(String),
    /// Normalized alternatives
    AnyOf(Vec<String>),
    /// Compiled regular expression
    Regex(Regex),
}

impl PatternMatcher {
    /// Prepare a pattern.
    pub fn new(pattern: &Pattern) -> std::result::Result<Self, regex::Error> {
        Ok(match pattern {
            Pattern::Text(text) => Self::Text(normalize_label(text)),
            Pattern::AnyOf(alternatives) => {
                Self::AnyOf(alternatives.iter().map(|a| normalize_label(a)).collect())
            }
            Pattern::Regex(source) => Self::Regex(Regex::new(source)?),
        })
    }

    /// Whether a raw (not yet normalized) description matches.
    pub fn is_match(&self, description: &str) -> bool {
        self.matches_normalized(&normalize_label(description))
    }

    fn matches_normalized(&self, normalized: &str) -> bool {
        match self {
            Self::Text(text) => normalized.contains(text.as_str()),
            Self::AnyOf(alternatives) => alternatives.iter().any(|a| normalized.contains(a.as_str())),
            Self::Regex(regex) => regex.is_match(normalized),
        }
    }

    /// Sum of matching values, or `None` when nothing matched.
    fn matched_sum(&self, rows: &RowSet) -> Option<f64> {
        rows.iter()
            .filter(|item| self.is_match(&item.description))
            .map(|item| item.value)
            .reduce(|acc, value| acc + value)
    }
}

/// Sum the values of every line item whose description matches `pattern`.
///
/// Returns exactly 0 when nothing matches; an account missing from a filing
/// is a valid state.
pub fn match_sum(rows: &RowSet, pattern: &PatternMatcher) -> f64 {
    pattern.matched_sum(rows).unwrap_or(0.0)
}

#[derive(Debug, Clone)]
struct CompiledRule {
    candidates: Vec<PatternMatcher>,
    fallback_codes: Vec<String>,
}

impl CompiledRule {
    fn compile(category: Category, rule: &CategoryRule) -> Result<Self> {
        let candidates = rule
            .candidates
            .iter()
            .map(|pattern| {
                PatternMatcher::new(pattern).map_err(|source| RatioError::InvalidPattern {
                    category,
                    pattern: format!("{:?}", pattern),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            candidates,
            fallback_codes: rule.fallback_codes.clone(),
        })
    }
}

/// Resolves account categories against row-sets using a catalog.
#[derive(Debug, Clone)]
pub struct AccountMatcher {
    rules: BTreeMap<Category, CompiledRule>,
}

impl AccountMatcher {
    /// Compile every rule of a catalog.
    ///
    /// # Errors
    /// Returns [`RatioError::InvalidPattern`] if a regex does not compile.
    pub fn new(catalog: &AccountCatalog) -> Result<Self> {
        let rules = catalog
            .iter()
            .map(|(category, rule)| -> Result<_> {
                Ok((category, CompiledRule::compile(category, rule)?))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { rules })
    }

    /// Matcher for the built-in CVM catalog.
    pub fn cvm() -> Result<Self> {
        Self::new(&AccountCatalog::cvm())
    }

    /// Resolve a category in a row-set.
    ///
    /// The first candidate matching at least one item is summed. Otherwise
    /// the first fallback code present in the row-set is summed. Otherwise
    /// the category is 0.
    pub fn resolve(&self, category: Category, rows: &RowSet) -> f64 {
        let Some(rule) = self.rules.get(&category) else {
            return 0.0;
        };

        if let Some(sum) = rule
            .candidates
            .iter()
            .find_map(|candidate| candidate.matched_sum(rows))
        {
            return sum;
        }

        for code in &rule.fallback_codes {
            let mut by_code = rows
                .iter()
                .filter(|item| item.account_code == *code)
                .peekable();
            if by_code.peek().is_some() {
                let sum = by_code.map(|item| item.value).sum();
                debug!(category = %category, code = %code, sum, "resolved by account code");
                return sum;
            }
        }

        0.0
    }
}
