//! SQLite caching layer for filtered row-sets.

use crate::error::{DataError, Result};
use crate::model::{FilingKind, LineItem, RowSet, RowSetKey, Scope, StatementKind};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// SQLite cache for row-sets.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

/// Summary of what the cache holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Cached row-sets
    pub row_sets: usize,
    /// Cached line items across all row-sets
    pub line_items: usize,
    /// Distinct companies
    pub companies: usize,
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS row_sets (
                company TEXT NOT NULL,
                year INTEGER NOT NULL,
                statement TEXT NOT NULL,
                filing TEXT NOT NULL,
                scope TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (company, year, statement, filing, scope)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS line_items (
                company TEXT NOT NULL,
                year INTEGER NOT NULL,
                statement TEXT NOT NULL,
                filing TEXT NOT NULL,
                scope TEXT NOT NULL,
                position INTEGER NOT NULL,
                account_code TEXT NOT NULL,
                description TEXT NOT NULL,
                value REAL NOT NULL,
                PRIMARY KEY (company, year, statement, filing, scope, position)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_line_items_company_year ON line_items(company, year)",
            [],
        )?;

        Ok(())
    }

    /// Get a cached row-set, if present.
    pub fn get_row_set(&self, key: &RowSetKey) -> Result<Option<RowSet>> {
        let cached: Option<String> = self
            .conn
            .query_row(
                "SELECT cached_at FROM row_sets
                 WHERE company = ?1 AND year = ?2 AND statement = ?3 AND filing = ?4 AND scope = ?5",
                params![
                    key.company,
                    key.year,
                    key.statement.cvm_code(),
                    key.filing.code(),
                    key.scope.code()
                ],
                |row| row.get(0),
            )
            .optional()?;

        if cached.is_none() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT account_code, description, value FROM line_items
             WHERE company = ?1 AND year = ?2 AND statement = ?3 AND filing = ?4 AND scope = ?5
             ORDER BY position ASC",
        )?;

        let items = stmt
            .query_map(
                params![
                    key.company,
                    key.year,
                    key.statement.cvm_code(),
                    key.filing.code(),
                    key.scope.code()
                ],
                |row| {
                    Ok(LineItem {
                        account_code: row.get(0)?,
                        description: row.get(1)?,
                        value: row.get(2)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Some(RowSet::new(items)))
    }

    /// Store a row-set, replacing any previous copy.
    pub fn put_row_set(&self, key: &RowSetKey, rows: &RowSet) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();
        let statement = key.statement.cvm_code();
        let filing = key.filing.code();
        let scope = key.scope.code();

        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM line_items
             WHERE company = ?1 AND year = ?2 AND statement = ?3 AND filing = ?4 AND scope = ?5",
            params![key.company, key.year, statement, filing, scope],
        )?;

        tx.execute(
            "INSERT OR REPLACE INTO row_sets (company, year, statement, filing, scope, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![key.company, key.year, statement, filing, scope, cached_at],
        )?;

        for (position, item) in rows.iter().enumerate() {
            tx.execute(
                "INSERT INTO line_items
                 (company, year, statement, filing, scope, position, account_code, description, value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    key.company,
                    key.year,
                    statement,
                    filing,
                    scope,
                    position as i64,
                    item.account_code,
                    item.description,
                    item.value
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// When a row-set was cached.
    pub fn cached_at(&self, key: &RowSetKey) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT cached_at FROM row_sets
                 WHERE company = ?1 AND year = ?2 AND statement = ?3 AND filing = ?4 AND scope = ?5",
                params![
                    key.company,
                    key.year,
                    key.statement.cvm_code(),
                    key.filing.code(),
                    key.scope.code()
                ],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|value| {
            DateTime::parse_from_rfc3339(&value)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DataError::Parse(format!("Invalid cache timestamp {}: {}", value, e)))
        })
        .transpose()
    }

    /// Years cached for a company, for a given statement, filing and scope.
    pub fn cached_years(
        &self,
        company: &str,
        statement: StatementKind,
        filing: FilingKind,
        scope: Scope,
    ) -> Result<Vec<i32>> {
        let mut stmt = self.conn.prepare(
            "SELECT year FROM row_sets
             WHERE company = ?1 AND statement = ?2 AND filing = ?3 AND scope = ?4
             ORDER BY year ASC",
        )?;

        let years = stmt
            .query_map(
                params![company, statement.cvm_code(), filing.code(), scope.code()],
                |row| row.get(0),
            )?
            .collect::<std::result::Result<Vec<i32>, _>>()?;

        Ok(years)
    }

    /// Remove everything cached for a company.
    pub fn invalidate_company(&self, company: &str) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM line_items WHERE company = ?1", params![company])?;
        let removed = tx.execute("DELETE FROM row_sets WHERE company = ?1", params![company])?;
        tx.commit()?;
        Ok(removed)
    }

    /// Remove every cached row-set.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM line_items", [])?;
        self.conn.execute("DELETE FROM row_sets", [])?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn stats(&self) -> Result<CacheStats> {
        let row_sets: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM row_sets", [], |row| row.get(0))?;
        let line_items: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM line_items", [], |row| row.get(0))?;
        let companies: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT company) FROM row_sets",
            [],
            |row| row.get(0),
        )?;

        Ok(CacheStats {
            row_sets: row_sets as usize,
            line_items: line_items as usize,
            companies: companies as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(year: i32) -> RowSetKey {
        RowSetKey::new(
            "022470",
            year,
            StatementKind::LiabilitiesBalance,
            FilingKind::Annual,
            Scope::Consolidated,
        )
    }

    fn rows() -> RowSet {
        RowSet::new(vec![
            LineItem::new("2.01", "Passivo Circulante", 500.0),
            LineItem::new("2.01.02", "Fornecedores", 120.0),
            LineItem::new("2.03", "Patrimônio Líquido Consolidado", 900.0),
        ])
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put_row_set(&key(2021), &rows()).unwrap();

        let cached = cache.get_row_set(&key(2021)).unwrap().unwrap();
        assert_eq!(cached, rows());
        assert!(cache.cached_at(&key(2021)).unwrap().is_some());
    }

    #[test]
    fn test_missing_row_set() {
        let cache = SqliteCache::in_memory().unwrap();
        assert!(cache.get_row_set(&key(2021)).unwrap().is_none());
        assert!(cache.cached_at(&key(2021)).unwrap().is_none());
    }

    #[test]
    fn test_put_replaces_previous_copy() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put_row_set(&key(2021), &rows()).unwrap();
        let shorter = RowSet::new(vec![LineItem::new("2.01", "Passivo Circulante", 1.0)]);
        cache.put_row_set(&key(2021), &shorter).unwrap();

        assert_eq!(cache.get_row_set(&key(2021)).unwrap().unwrap(), shorter);
        assert_eq!(cache.stats().unwrap().line_items, 1);
    }

    #[test]
    fn test_stats_and_years() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put_row_set(&key(2021), &rows()).unwrap();
        cache.put_row_set(&key(2020), &rows()).unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.row_sets, 2);
        assert_eq!(stats.line_items, 6);
        assert_eq!(stats.companies, 1);

        let years = cache
            .cached_years(
                "22470",
                StatementKind::LiabilitiesBalance,
                FilingKind::Annual,
                Scope::Consolidated,
            )
            .unwrap();
        assert_eq!(years, vec![2020, 2021]);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put_row_set(&key(2021), &rows()).unwrap();
        assert_eq!(cache.invalidate_company("22470").unwrap(), 1);
        assert_eq!(cache.stats().unwrap(), CacheStats::default());

        cache.put_row_set(&key(2021), &rows()).unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.stats().unwrap().row_sets, 0);
    }
}
