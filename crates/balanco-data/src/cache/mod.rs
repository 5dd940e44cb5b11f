//! Caching layer for filtered row-sets.

pub mod cached;
pub mod sqlite;

pub use cached::{CacheMode, CachedSource};
pub use sqlite::{CacheStats, SqliteCache};
