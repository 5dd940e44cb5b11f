//! Analysis pipeline for the command line.
//!
//! Builds the CVM client, wraps it in the row-set cache unless told not to,
//! and runs the analyzer while a progress bar tracks fiscal years.

use super::cache_manager;
use balanco::{Analysis, AnalysisConfig, AnalysisError, Analyzer, YearOutcome};
use balanco_data::{
    CacheMode, CachedSource, ClientConfig, CvmClient, DataError, FilingKind, RowSetSource, Scope,
};
use indicatif::ProgressBar;
use tracing::warn;

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    /// Client or cache setup failed.
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    /// The analysis itself failed.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Where row-sets come from.
#[derive(Debug, Clone)]
pub(crate) struct SourceOptions {
    /// Read ITR (quarterly) instead of DFP (annual) filings.
    pub quarterly: bool,
    /// Read parent-only instead of consolidated statements.
    pub individual: bool,
    /// Whether to use the cache.
    pub use_cache: bool,
    /// Whether to force refresh (ignore cached row-sets).
    pub force_refresh: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            quarterly: false,
            individual: false,
            use_cache: true,
            force_refresh: false,
        }
    }
}

impl SourceOptions {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            filing: if self.quarterly {
                FilingKind::Quarterly
            } else {
                FilingKind::Annual
            },
            scope: if self.individual {
                Scope::Individual
            } else {
                Scope::Consolidated
            },
            ..ClientConfig::default()
        }
    }

    const fn cache_mode(&self) -> CacheMode {
        if self.force_refresh {
            CacheMode::Refresh
        } else {
            CacheMode::Use
        }
    }
}

/// Run an analysis against the CVM portal.
pub(crate) async fn run_analysis(
    config: AnalysisConfig,
    options: &SourceOptions,
    progress: Option<&ProgressBar>,
) -> Result<Analysis, PipelineError> {
    let client = CvmClient::with_config(options.client_config())?;

    if !options.use_cache {
        return drive(client, config, progress).await;
    }

    match cache_manager::open_cache() {
        Ok(cache) => {
            let source = CachedSource::with_mode(client, cache, options.cache_mode());
            drive(source, config, progress).await
        }
        Err(e) => {
            warn!(error = %e, "cache unavailable, fetching without it");
            drive(client, config, progress).await
        }
    }
}

async fn drive<S: RowSetSource>(
    source: S,
    config: AnalysisConfig,
    progress: Option<&ProgressBar>,
) -> Result<Analysis, PipelineError> {
    let analyzer = Analyzer::new(source, config)?;

    if let Some(pb) = progress {
        pb.set_length(analyzer.config().year_count() as u64);
        pb.set_message(format!("Company {}", analyzer.config().company));
    }

    let analysis = analyzer
        .run_with_progress(|year, outcome| {
            if let Some(pb) = progress {
                if let YearOutcome::Skipped { reason } = outcome {
                    pb.println(format!("  {} skipped: {}", year, reason));
                }
                pb.set_message(format!("FY{} {}", year, outcome));
                pb.inc(1);
            }
        })
        .await?;

    Ok(analysis)
}
