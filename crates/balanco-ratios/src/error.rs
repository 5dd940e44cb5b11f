//! Error types for the ratio engine.

use crate::catalog::Category;
use thiserror::Error;

/// Result type for ratio engine operations.
pub type Result<T> = std::result::Result<T, RatioError>;

/// Errors raised while configuring the engine or assembling a series.
///
/// Numeric edge cases are never errors; they resolve to sentinel values.
#[derive(Debug, Error)]
pub enum RatioError {
    /// A catalog regex failed to compile
    #[error("Invalid pattern for {category}: {pattern}: {source}")]
    InvalidPattern {
        /// Category the pattern belongs to
        category: Category,
        /// Pattern source text
        pattern: String,
        /// Underlying regex error
        source: regex::Error,
    },

    /// Catalog file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not valid JSON
    #[error("Catalog format error: {0}")]
    Format(#[from] serde_json::Error),

    /// A year was appended out of order
    #[error("Year {year} does not follow {last}")]
    NonIncreasingYear {
        /// Year being appended
        year: i32,
        /// Last year already in the series
        last: i32,
    },
}
