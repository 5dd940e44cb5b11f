//! A [`RowSetSource`] wrapper that reads through the SQLite cache.

use super::sqlite::SqliteCache;
use crate::error::{DataError, Result};
use crate::model::{FilingKind, RowSet, RowSetKey, Scope, StatementKind};
use crate::source::RowSetSource;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, warn};

/// How a [`CachedSource`] uses its cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheMode {
    /// Read from the cache first and store whatever is fetched
    #[default]
    Use,
    /// Always fetch, then overwrite the cached copy
    Refresh,
    /// Neither read nor write the cache
    Bypass,
}

/// Read-through cache in front of another source.
///
/// Cache failures never fail a fetch; they are logged and the inner source
/// is used instead.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<SqliteCache>,
    mode: CacheMode,
}

impl<S: RowSetSource + Sync> CachedSource<S> {
    /// Wrap `inner` with `cache`, in [`CacheMode::Use`].
    pub fn new(inner: S, cache: SqliteCache) -> Self {
        Self::with_mode(inner, cache, CacheMode::Use)
    }

    /// Wrap `inner` with an explicit cache mode.
    pub fn with_mode(inner: S, cache: SqliteCache, mode: CacheMode) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            mode,
        }
    }

    /// The wrapped source.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Active cache mode.
    pub const fn mode(&self) -> CacheMode {
        self.mode
    }

    fn lookup(&self, key: &RowSetKey) -> Result<Option<RowSet>> {
        let cache = self
            .cache
            .lock()
            .map_err(|_| DataError::Cache("cache lock poisoned".to_string()))?;
        cache.get_row_set(key)
    }

    fn store(&self, key: &RowSetKey, rows: &RowSet) -> Result<()> {
        let cache = self
            .cache
            .lock()
            .map_err(|_| DataError::Cache("cache lock poisoned".to_string()))?;
        cache.put_row_set(key, rows)
    }
}

impl<S: RowSetSource + Sync> RowSetSource for CachedSource<S> {
    async fn fetch(&self, year: i32, statement: StatementKind, company: &str) -> Result<RowSet> {
        let key = RowSetKey::new(company, year, statement, self.filing(), self.scope());

        if self.mode == CacheMode::Use {
            match self.lookup(&key) {
                Ok(Some(rows)) => {
                    debug!(company = %key.company, year, statement = %statement, "cache hit");
                    return Ok(rows);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "cache read failed, fetching instead"),
            }
        }

        let rows = self.inner.fetch(year, statement, company).await?;

        if self.mode != CacheMode::Bypass
            && let Err(e) = self.store(&key, &rows)
        {
            warn!(error = %e, "failed to cache row-set");
        }

        Ok(rows)
    }

    fn filing(&self) -> FilingKind {
        self.inner.filing()
    }

    fn scope(&self) -> Scope {
        self.inner.scope()
    }
}
