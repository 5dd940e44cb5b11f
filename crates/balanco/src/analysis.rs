//! Series orchestration over a range of fiscal years.
//!
//! Years are processed in strictly ascending order: every calculator needs the
//! closing balances of the year before. The three statements of a single year
//! are fetched concurrently.

use balanco_data::{DataError, RowSetSource, StatementKind};
use balanco_ratios::{
    AccountCatalog, AccountMatcher, AdjustedDupont, AdjustedDupontConfig, Analysis, Calculator,
    ConfigurableCalculator, FiscalStatements, PeriodState, RatioCalculator, RatioConfig,
    RatioError, Series, SeriesBuilder, TraditionalDupont,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result type for analyses.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that abort an analysis.
///
/// A year whose statements cannot be retrieved is not an error: it becomes a
/// gap in the resulting series.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The year range is empty
    #[error("Invalid year range: {from} to {to}")]
    InvalidRange {
        /// First requested year
        from: i32,
        /// Last requested year
        to: i32,
    },

    /// No company code was given
    #[error("Company code is empty")]
    EmptyCompany,

    /// Non-recoverable data error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Catalog or series error
    #[error("Ratio error: {0}")]
    Ratio(#[from] RatioError),
}

/// What to analyze and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// CVM company code
    pub company: String,
    /// First fiscal year (inclusive)
    pub from: i32,
    /// Last fiscal year (inclusive)
    pub to: i32,
    /// Account classification rules
    pub catalog: AccountCatalog,
    /// Ratio calculator settings
    pub ratios: RatioConfig,
    /// Adjusted DuPont settings
    pub adjusted: AdjustedDupontConfig,
}

impl AnalysisConfig {
    /// Analyze `company` from `from` to `to` with the built-in catalog.
    pub fn new(company: impl Into<String>, from: i32, to: i32) -> Self {
        Self {
            company: company.into(),
            from,
            to,
            catalog: AccountCatalog::default(),
            ratios: RatioConfig::default(),
            adjusted: AdjustedDupontConfig::default(),
        }
    }

    /// Use a custom account catalog.
    pub fn with_catalog(mut self, catalog: AccountCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Use a different tax rate for the adjusted DuPont model.
    pub fn with_tax_rate(mut self, tax_rate: f64) -> Self {
        self.adjusted.tax_rate = tax_rate;
        self
    }

    /// Check the company code and the year range.
    ///
    /// # Errors
    /// Returns [`AnalysisError::EmptyCompany`] or
    /// [`AnalysisError::InvalidRange`].
    pub fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            return Err(AnalysisError::EmptyCompany);
        }
        if self.from > self.to {
            return Err(AnalysisError::InvalidRange {
                from: self.from,
                to: self.to,
            });
        }
        Ok(())
    }

    /// Number of fiscal years in the range.
    pub fn year_count(&self) -> usize {
        usize::try_from(self.to - self.from + 1).unwrap_or(0)
    }
}

/// Outcome of one fiscal year, reported to progress callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearOutcome {
    /// Every model produced an indicator set
    Computed,
    /// The year's statements could not be retrieved
    Skipped {
        /// Why the year was skipped
        reason: String,
    },
}

impl fmt::Display for YearOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed => f.write_str("computed"),
            Self::Skipped { reason } => write!(f, "skipped ({})", reason),
        }
    }
}

/// One calculator with its builder and carried state.
struct Track<'a> {
    calculator: &'a dyn Calculator,
    builder: SeriesBuilder,
    state: PeriodState,
}

impl<'a> Track<'a> {
    fn new(calculator: &'a dyn Calculator) -> Self {
        Self {
            calculator,
            builder: Series::builder(calculator.model()),
            state: PeriodState::Absent,
        }
    }

    fn compute(
        &mut self,
        matcher: &AccountMatcher,
        statements: &FiscalStatements,
    ) -> std::result::Result<usize, RatioError> {
        let (set, next) = self
            .calculator
            .compute_statements(matcher, statements, &self.state);
        let count = set.len();
        self.builder.push(statements.fiscal_year, set)?;
        self.state = next;
        Ok(count)
    }

    fn skip(&mut self, year: i32, reason: &str) -> std::result::Result<(), RatioError> {
        self.builder.skip(year, reason)
    }
}

/// Runs the three calculators over a year range of one company.
#[derive(Debug)]
pub struct Analyzer<S> {
    source: S,
    config: AnalysisConfig,
    matcher: AccountMatcher,
    ratios: RatioCalculator,
    traditional: TraditionalDupont,
    adjusted: AdjustedDupont,
}

impl<S: RowSetSource> Analyzer<S> {
    /// Create an analyzer reading from `source`.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or a catalog pattern does not
    /// compile.
    pub fn new(source: S, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let matcher = AccountMatcher::new(&config.catalog)?;

        Ok(Self {
            source,
            matcher,
            ratios: RatioCalculator::with_config(config.ratios.clone()),
            traditional: TraditionalDupont::new(),
            adjusted: AdjustedDupont::with_config(config.adjusted.clone()),
            config,
        })
    }

    /// Row-set source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Analysis settings.
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Fetch the three statements of one fiscal year.
    pub async fn fetch_year(&self, year: i32) -> balanco_data::Result<FiscalStatements> {
        let company = self.config.company.as_str();
        let (assets, liabilities, income) = futures::try_join!(
            self.source.fetch(year, StatementKind::AssetsBalance, company),
            self.source.fetch(year, StatementKind::LiabilitiesBalance, company),
            self.source.fetch(year, StatementKind::IncomeStatement, company),
        )?;
        debug!(
            year,
            assets = assets.len(),
            liabilities = liabilities.len(),
            income = income.len(),
            "fetched statements"
        );
        Ok(FiscalStatements::new(year, assets, liabilities, income))
    }

    /// Run the analysis.
    ///
    /// # Errors
    /// Only non-recoverable data errors abort the run; retrieval failures and
    /// empty results become gaps.
    pub async fn run(&self) -> Result<Analysis> {
        self.run_with_progress(|_, _| {}).await
    }

    /// Run the analysis, reporting each year's outcome as it completes.
    ///
    /// # Errors
    /// See [`run`](Self::run).
    pub async fn run_with_progress(
        &self,
        mut progress: impl FnMut(i32, &YearOutcome),
    ) -> Result<Analysis> {
        let company = self.config.company.as_str();
        let mut tracks = [
            Track::new(&self.ratios),
            Track::new(&self.traditional),
            Track::new(&self.adjusted),
        ];

        for year in self.config.from..=self.config.to {
            let outcome = match self.fetch_year(year).await {
                Ok(statements) => {
                    let mut indicators = 0;
                    for track in &mut tracks {
                        indicators += track.compute(&self.matcher, &statements)?;
                    }
                    info!(company, year, indicators, "computed fiscal year");
                    YearOutcome::Computed
                }
                Err(e) if e.is_skippable() => {
                    let reason = e.to_string();
                    warn!(company, year, reason = %reason, "skipping fiscal year");
                    for track in &mut tracks {
                        track.skip(year, &reason)?;
                    }
                    YearOutcome::Skipped { reason }
                }
                Err(e) => return Err(e.into()),
            };
            progress(year, &outcome);
        }

        let [ratios, traditional, adjusted] = tracks.map(|track| track.builder.finish());

        Ok(Analysis {
            company: self.config.company.clone(),
            from: self.config.from,
            to: self.config.to,
            ratios,
            traditional,
            adjusted,
        })
    }
}

/// Analyze one company with a fresh [`Analyzer`].
///
/// # Errors
/// See [`Analyzer::new`] and [`Analyzer::run`].
pub async fn analyze<S: RowSetSource>(source: S, config: AnalysisConfig) -> Result<Analysis> {
    Analyzer::new(source, config)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use balanco_data::{LineItem, MemorySource, RowSet};
    use balanco_ratios::Indicator;

    fn assets(inventory: f64) -> RowSet {
        RowSet::new(vec![
            LineItem::new("1", "Ativo Total", 3000.0),
            LineItem::new("1.01", "Ativo Circulante", 1200.0),
            LineItem::new("1.01.04", "Estoques", inventory),
        ])
    }

    fn liabilities() -> RowSet {
        RowSet::new(vec![
            LineItem::new("2.01", "Passivo Circulante", 600.0),
            LineItem::new("2.03", "Patrimônio Líquido Consolidado", 1500.0),
        ])
    }

    fn income() -> RowSet {
        RowSet::new(vec![
            LineItem::new("3.01", "Receita de Venda de Bens e/ou Serviços", 2000.0),
            LineItem::new("3.02", "Custo dos Bens e/ou Serviços Vendidos", -1460.0),
            LineItem::new("3.11", "Lucro/Prejuízo Consolidado do Período", 150.0),
        ])
    }

    fn with_year(source: MemorySource, year: i32, inventory: f64) -> MemorySource {
        source
            .with("1023", year, StatementKind::AssetsBalance, assets(inventory))
            .with("1023", year, StatementKind::LiabilitiesBalance, liabilities())
            .with("1023", year, StatementKind::IncomeStatement, income())
    }

    #[tokio::test]
    async fn test_consecutive_years_average_inventory() {
        let source = with_year(with_year(MemorySource::new(), 2020, 200.0), 2021, 400.0);
        let analysis = analyze(source, AnalysisConfig::new("1023", 2020, 2021))
            .await
            .unwrap();

        // 200 / 1460 * 365
        assert_eq!(
            analysis.ratios.value(2020, Indicator::DaysInventory).unwrap().finite(),
            Some(50.0)
        );
        // average 300 / 1460 * 365
        assert_eq!(
            analysis.ratios.value(2021, Indicator::DaysInventory).unwrap().finite(),
            Some(75.0)
        );
        assert!(analysis.gaps().is_empty());
    }

    #[tokio::test]
    async fn test_year_after_gap_uses_current_values() {
        let source = with_year(with_year(MemorySource::new(), 2019, 200.0), 2021, 400.0);
        let analysis = analyze(source, AnalysisConfig::new("1023", 2019, 2021))
            .await
            .unwrap();

        assert_eq!(analysis.years(), vec![2019, 2021]);
        for series in analysis.all() {
            assert!(series.gaps().contains_key(&2020));
        }
        // 400 / 1460 * 365, no averaging against 2019
        assert_eq!(
            analysis.ratios.value(2021, Indicator::DaysInventory).unwrap().finite(),
            Some(100.0)
        );
    }

    #[tokio::test]
    async fn test_progress_reports_every_year_in_order() {
        let source = with_year(MemorySource::new(), 2022, 100.0);
        let analyzer = Analyzer::new(source, AnalysisConfig::new("1023", 2021, 2023)).unwrap();

        let mut seen = Vec::new();
        analyzer
            .run_with_progress(|year, outcome| seen.push((year, outcome.clone())))
            .await
            .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1], (2022, YearOutcome::Computed));
        assert!(matches!(seen[0].1, YearOutcome::Skipped { .. }));
        assert!(matches!(seen[2].1, YearOutcome::Skipped { .. }));
        assert!(seen[2].1.to_string().starts_with("skipped"));
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            AnalysisConfig::new("1023", 2022, 2021).validate(),
            Err(AnalysisError::InvalidRange { from: 2022, to: 2021 })
        ));
        assert!(matches!(
            AnalysisConfig::new("  ", 2020, 2021).validate(),
            Err(AnalysisError::EmptyCompany)
        ));
        assert_eq!(AnalysisConfig::new("1023", 2019, 2023).year_count(), 5);
        let config = AnalysisConfig::new("1023", 2019, 2023).with_tax_rate(0.25);
        assert_eq!(config.adjusted.tax_rate, 0.25);
    }

    #[test]
    fn test_invalid_catalog_is_rejected() {
        use balanco_ratios::{Category, CategoryRule, Pattern};

        let catalog = AccountCatalog::cvm().with_rule(
            Category::Inventory,
            CategoryRule::new(vec![Pattern::regex("(unclosed")], ["1.01.04"]),
        );
        let config = AnalysisConfig::new("1023", 2020, 2021).with_catalog(catalog);
        assert!(matches!(
            Analyzer::new(MemorySource::new(), config),
            Err(AnalysisError::Ratio(RatioError::InvalidPattern { .. }))
        ));
    }
}
