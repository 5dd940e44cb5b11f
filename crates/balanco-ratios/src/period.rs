//! Closing balances carried from one fiscal year into the next.

use crate::statements::AccountSums;
use serde::{Deserialize, Serialize};

/// Average of a prior closing balance and the current one.
///
/// With no prior balance the current value is returned unchanged. Every
/// averaged denominator goes through this function.
///
/// # Example
/// ```
/// # use balanco_ratios::period::average;
/// assert_eq!(average(None, 80.0), 80.0);
/// assert_eq!(average(Some(120.0), 80.0), 100.0);
/// ```
pub fn average(previous: Option<f64>, current: f64) -> f64 {
    match previous {
        Some(previous) => (previous + current) / 2.0,
        None => current,
    }
}

/// Closing balances of one fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosingBalances {
    /// Fiscal year the balances close
    pub fiscal_year: i32,
    /// Shareholders' equity
    pub equity: f64,
    /// Inventories
    pub inventory: f64,
    /// Trade receivables
    pub receivables: f64,
    /// Trade payables
    pub payables: f64,
    /// Total assets
    pub total_assets: f64,
    /// Gross financial debt (loans and financing)
    pub gross_debt: f64,
}

impl ClosingBalances {
    /// Closing balances of the year described by `sums`.
    pub const fn from_sums(sums: &AccountSums) -> Self {
        Self {
            fiscal_year: sums.fiscal_year,
            equity: sums.equity,
            inventory: sums.inventory,
            receivables: sums.receivables,
            payables: sums.suppliers,
            total_assets: sums.total_assets,
            gross_debt: sums.gross_debt,
        }
    }

    /// Equity plus gross debt: the capital financing the net assets.
    pub const fn net_assets(&self) -> f64 {
        self.equity + self.gross_debt
    }
}

/// State threaded from year to year by the series orchestrator.
///
/// Replaced wholesale after each processed year, never patched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PeriodState {
    /// No prior year has been processed
    #[default]
    Absent,
    /// Balances of the last processed year
    Closed(ClosingBalances),
}

impl PeriodState {
    /// Balances to average against when computing `fiscal_year`.
    ///
    /// Only the immediately preceding year qualifies. After a gap the next
    /// year is computed like a first year.
    pub const fn previous_for(&self, fiscal_year: i32) -> Option<&ClosingBalances> {
        match self {
            Self::Closed(balances) if balances.fiscal_year + 1 == fiscal_year => Some(balances),
            _ => None,
        }
    }

    /// Last closed balances, whatever their year.
    pub const fn closing(&self) -> Option<&ClosingBalances> {
        match self {
            Self::Closed(balances) => Some(balances),
            Self::Absent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn closed(fiscal_year: i32) -> PeriodState {
        PeriodState::Closed(ClosingBalances {
            fiscal_year,
            equity: 100.0,
            inventory: 10.0,
            receivables: 20.0,
            payables: 5.0,
            total_assets: 300.0,
            gross_debt: 50.0,
        })
    }

    #[rstest]
    #[case(None, 42.0, 42.0)]
    #[case(Some(10.0), 30.0, 20.0)]
    #[case(Some(-10.0), 10.0, 0.0)]
    #[case(Some(0.0), 0.0, 0.0)]
    fn test_average(#[case] previous: Option<f64>, #[case] current: f64, #[case] expected: f64) {
        assert_eq!(average(previous, current), expected);
    }

    #[test]
    fn test_previous_only_for_following_year() {
        let state = closed(2020);
        assert!(state.previous_for(2021).is_some());
        assert!(state.previous_for(2022).is_none());
        assert!(state.previous_for(2020).is_none());
        assert!(PeriodState::Absent.previous_for(2021).is_none());
    }

    #[test]
    fn test_net_assets() {
        let state = closed(2020);
        assert_eq!(state.closing().unwrap().net_assets(), 150.0);
    }
}
