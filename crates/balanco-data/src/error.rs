//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// The archive or statement file could not be obtained
    #[error("Retrieval failed for {resource}: {reason}")]
    Retrieval {
        /// URL or archive member that was requested
        resource: String,
        /// Reason for the failure
        reason: String,
    },

    /// The company/year combination produced no rows after filtering
    #[error("No {statement} rows for company {company} in {year}")]
    EmptyResult {
        /// Company code that was queried
        company: String,
        /// Fiscal year that was queried
        year: i32,
        /// Statement that was queried
        statement: String,
    },

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Invalid company code
    #[error("Invalid company code: {0}")]
    InvalidCompany(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Whether the failure only means "no data for this year".
    ///
    /// Retrieval and empty-result failures are tolerated by the series
    /// orchestrator, which records a gap and moves on to the next year.
    /// Network and archive errors are retrieval failures too.
    pub const fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::Retrieval { .. }
                | Self::EmptyResult { .. }
                | Self::Network(_)
                | Self::Archive(_)
                | Self::Csv(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_and_empty_are_skippable() {
        let retrieval = DataError::Retrieval {
            resource: "dfp_cia_aberta_2020.zip".to_string(),
            reason: "HTTP 404".to_string(),
        };
        let empty = DataError::EmptyResult {
            company: "22470".to_string(),
            year: 2020,
            statement: "BPA".to_string(),
        };
        assert!(retrieval.is_skippable());
        assert!(empty.is_skippable());
    }

    #[test]
    fn test_local_failures_are_not_skippable() {
        assert!(!DataError::Cache("locked".to_string()).is_skippable());
        assert!(!DataError::InvalidCompany(String::new()).is_skippable());
    }
}
