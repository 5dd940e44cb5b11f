//! Cache manager for statement row-sets.
//!
//! Keeps the SQLite cache at a platform-specific default location.

use balanco_data::DataError;
use balanco_data::SqliteCache;
use balanco_data::cache::CacheStats;
use std::path::PathBuf;

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/balanco/`
/// - macOS: `~/Library/Caches/balanco/`
/// - Windows: `%LOCALAPPDATA%\balanco\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("balanco")
}

/// Get the default cache database path.
pub(crate) fn default_cache_path() -> PathBuf {
    default_cache_dir().join("balanco.db")
}

/// Get the configured cache path.
///
/// `BALANCO_CACHE` overrides the default location.
pub(crate) fn get_cache_path() -> PathBuf {
    std::env::var_os("BALANCO_CACHE").map_or_else(default_cache_path, PathBuf::from)
}

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache() -> Result<SqliteCache, DataError> {
    let cache_path = get_cache_path();

    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteCache::new(&cache_path)
}

/// Statistics of the cache, if it exists.
pub(crate) fn cache_stats() -> Option<CacheStats> {
    if !get_cache_path().exists() {
        return None;
    }
    open_cache().and_then(|cache| cache.stats()).ok()
}

/// Print where the cache lives and what it holds.
pub(crate) fn print_cache_info() {
    let path = get_cache_path();
    println!("  Cache location: {}", path.display());
    match cache_stats() {
        Some(stats) => println!(
            "  Cached data: {} row-sets ({} line items) for {} companies",
            stats.row_sets, stats.line_items, stats.companies
        ),
        None => println!("  Cached data: none"),
    }
}
