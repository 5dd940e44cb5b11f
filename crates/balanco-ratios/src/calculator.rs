//! The contract shared by every per-year calculator.

use crate::indicator::{IndicatorSet, Model};
use crate::matcher::AccountMatcher;
use crate::period::PeriodState;
use crate::statements::{AccountSums, FiscalStatements};

/// A per-year calculator that threads closing balances from year to year.
///
/// `compute` never fails: zero denominators resolve to sentinel values.
/// The returned state replaces `prior` for the next year.
pub trait Calculator {
    /// Calculator name.
    fn name(&self) -> &str;

    /// Model the produced indicators belong to.
    fn model(&self) -> Model;

    /// Compute one fiscal year from matched account sums.
    fn compute(&self, sums: &AccountSums, prior: &PeriodState) -> (IndicatorSet, PeriodState);

    /// Compute one fiscal year straight from its three row-sets.
    fn compute_statements(
        &self,
        matcher: &AccountMatcher,
        statements: &FiscalStatements,
        prior: &PeriodState,
    ) -> (IndicatorSet, PeriodState) {
        self.compute(&AccountSums::extract(matcher, statements), prior)
    }
}

/// A calculator with tunable settings.
pub trait ConfigurableCalculator: Calculator {
    /// Settings type.
    type Config: Default;

    /// Create the calculator with settings.
    fn with_config(config: Self::Config) -> Self;

    /// Current settings.
    fn config(&self) -> &Self::Config;
}
