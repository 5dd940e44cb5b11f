//! Year-ordered indicator series.

use crate::error::{RatioError, Result};
use crate::indicator::{Indicator, IndicatorSet, IndicatorValue, Model};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Indicator sets of one model, keyed by fiscal year.
///
/// Years that could not be computed are kept as explicit gaps with the
/// reason they were skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    model: Model,
    years: BTreeMap<i32, IndicatorSet>,
    gaps: BTreeMap<i32, String>,
}

impl Series {
    /// Start building a series.
    pub fn builder(model: Model) -> SeriesBuilder {
        SeriesBuilder::new(model)
    }

    /// Model of the series.
    pub const fn model(&self) -> Model {
        self.model
    }

    /// Indicator set of a year.
    pub fn get(&self, year: i32) -> Option<&IndicatorSet> {
        self.years.get(&year)
    }

    /// One indicator of one year.
    pub fn value(&self, year: i32, indicator: Indicator) -> Option<IndicatorValue> {
        self.get(year).and_then(|set| set.get(indicator))
    }

    /// One indicator across every computed year, in year order.
    pub fn values(&self, indicator: Indicator) -> Vec<(i32, IndicatorValue)> {
        self.years
            .iter()
            .filter_map(|(year, set)| set.get(indicator).map(|value| (*year, value)))
            .collect()
    }

    /// Computed years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    /// Iterate over computed years in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &IndicatorSet)> {
        self.years.iter().map(|(year, set)| (*year, set))
    }

    /// Skipped years and why.
    pub const fn gaps(&self) -> &BTreeMap<i32, String> {
        &self.gaps
    }

    /// Indicators present in at least one year, in presentation order.
    pub fn indicators(&self) -> Vec<Indicator> {
        Indicator::ALL
            .iter()
            .copied()
            .filter(|indicator| self.years.values().any(|set| set.get(*indicator).is_some()))
            .collect()
    }

    /// Number of computed years.
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether no year was computed.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Appends years to a [`Series`] in strictly increasing order.
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    series: Series,
    last_year: Option<i32>,
}

impl SeriesBuilder {
    /// Create an empty builder.
    pub const fn new(model: Model) -> Self {
        Self {
            series: Series {
                model,
                years: BTreeMap::new(),
                gaps: BTreeMap::new(),
            },
            last_year: None,
        }
    }

    fn advance(&mut self, year: i32) -> Result<()> {
        if let Some(last) = self.last_year
            && year <= last
        {
            return Err(RatioError::NonIncreasingYear { year, last });
        }
        self.last_year = Some(year);
        Ok(())
    }

    /// Append a computed year.
    ///
    /// # Errors
    /// Returns [`RatioError::NonIncreasingYear`] if `year` is not after every
    /// year already appended or skipped.
    pub fn push(&mut self, year: i32, set: IndicatorSet) -> Result<()> {
        self.advance(year)?;
        self.series.years.insert(year, set);
        Ok(())
    }

    /// Record a skipped year.
    pub fn skip(&mut self, year: i32, reason: impl Into<String>) -> Result<()> {
        self.advance(year)?;
        self.series.gaps.insert(year, reason.into());
        Ok(())
    }

    /// Freeze the series.
    pub fn finish(self) -> Series {
        self.series
    }
}

/// The three series computed for one company over one year range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Company code as requested
    pub company: String,
    /// First requested fiscal year
    pub from: i32,
    /// Last requested fiscal year
    pub to: i32,
    /// Financial ratios
    pub ratios: Series,
    /// Traditional DuPont factors
    pub traditional: Series,
    /// Adjusted DuPont factors
    pub adjusted: Series,
}

impl Analysis {
    /// Series produced by a model.
    pub const fn series(&self, model: Model) -> &Series {
        match model {
            Model::Ratios => &self.ratios,
            Model::TraditionalDupont => &self.traditional,
            Model::AdjustedDupont => &self.adjusted,
        }
    }

    /// All series in model order.
    pub fn all(&self) -> [&Series; 3] {
        [&self.ratios, &self.traditional, &self.adjusted]
    }

    /// Years computed by at least one model, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.all().iter().flat_map(|series| series.years()).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Skipped years and why, as recorded by the ratio series.
    pub const fn gaps(&self) -> &BTreeMap<i32, String> {
        self.ratios.gaps()
    }

    /// One indicator of one year, from whichever model produces it.
    pub fn value(&self, year: i32, indicator: Indicator) -> Option<IndicatorValue> {
        self.series(indicator.model()).value(year, indicator)
    }
}
