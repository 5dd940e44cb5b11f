//! The row-set accessor contract and an in-memory implementation.

use crate::error::{DataError, Result};
use crate::model::{FilingKind, RowSet, Scope, StatementKind, normalize_company_code};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Supplies line items per (year, statement, company).
///
/// Implementations return row-sets already restricted to the company and
/// fiscal year, with zero-valued rows removed. A year that cannot be obtained
/// fails with [`DataError::Retrieval`]; a year with no rows left after
/// filtering fails with [`DataError::EmptyResult`].
pub trait RowSetSource {
    /// Fetch one statement of one company for one fiscal year.
    fn fetch(
        &self,
        year: i32,
        statement: StatementKind,
        company: &str,
    ) -> impl Future<Output = Result<RowSet>> + Send;

    /// Filing family this source reads.
    fn filing(&self) -> FilingKind {
        FilingKind::Annual
    }

    /// Consolidation scope this source reads.
    fn scope(&self) -> Scope {
        Scope::Consolidated
    }
}

/// Row-sets held in memory, keyed by company, year and statement.
///
/// Useful for tests and for feeding statements obtained elsewhere.
#[derive(Debug, Default)]
pub struct MemorySource {
    rows: HashMap<(String, i32, StatementKind), RowSet>,
    fetches: AtomicUsize,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row-set, replacing any previous one for the same key.
    pub fn insert(&mut self, company: &str, year: i32, statement: StatementKind, rows: RowSet) {
        self.rows
            .insert((normalize_company_code(company), year, statement), rows);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, company: &str, year: i32, statement: StatementKind, rows: RowSet) -> Self {
        self.insert(company, year, statement, rows);
        self
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl RowSetSource for MemorySource {
    async fn fetch(&self, year: i32, statement: StatementKind, company: &str) -> Result<RowSet> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let company = normalize_company_code(company);

        match self.rows.get(&(company.clone(), year, statement)) {
            Some(rows) if rows.is_empty() => Err(DataError::EmptyResult {
                company,
                year,
                statement: statement.cvm_code().to_string(),
            }),
            Some(rows) => Ok(rows.clone()),
            None => Err(DataError::Retrieval {
                resource: format!("{}/{}/{}", company, year, statement),
                reason: "not loaded in memory".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    #[tokio::test]
    async fn test_memory_source_roundtrip() {
        let source = MemorySource::new().with(
            "022470",
            2021,
            StatementKind::AssetsBalance,
            RowSet::new(vec![LineItem::new("1", "Ativo Total", 500.0)]),
        );

        let rows = source
            .fetch(2021, StatementKind::AssetsBalance, "22470")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_source_missing_year() {
        let source = MemorySource::new();
        let result = source.fetch(2019, StatementKind::IncomeStatement, "1").await;
        assert!(matches!(result, Err(DataError::Retrieval { .. })));
    }

    #[tokio::test]
    async fn test_memory_source_empty_rows() {
        let source =
            MemorySource::new().with("1", 2019, StatementKind::IncomeStatement, RowSet::default());
        let result = source.fetch(2019, StatementKind::IncomeStatement, "1").await;
        assert!(matches!(result, Err(DataError::EmptyResult { .. })));
    }
}
