//! Tabular summaries of indicator series.
//!
//! A summary lays a [`Series`] out with indicators as rows and fiscal years as
//! columns, using the display labels and precision classes of the indicator
//! registry.

use balanco_ratios::{Analysis, IndicatorValue, Model, Series, registry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const LABEL_WIDTH: usize = 30;
const CELL_WIDTH: usize = 12;

/// One indicator across the years of a summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryRow {
    /// Machine name of the indicator.
    pub name: String,

    /// Display label.
    pub label: String,

    /// Decimal places to display.
    pub decimals: usize,

    /// One value per summary year; `None` where the year lacks the indicator.
    pub values: Vec<Option<IndicatorValue>>,
}

impl SummaryRow {
    fn cell(&self, index: usize) -> String {
        match self.values.get(index).copied().flatten() {
            Some(IndicatorValue::Finite(value)) => format!("{:.*}", self.decimals, value),
            Some(IndicatorValue::Unbounded) => IndicatorValue::SENTINEL.to_string(),
            None => "-".to_string(),
        }
    }
}

/// Indicator table for one series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesSummary {
    /// Table title.
    pub title: String,

    /// Model of the summarized series.
    pub model: Model,

    /// Column years, ascending.
    pub years: Vec<i32>,

    /// Indicator rows in registry order.
    pub rows: Vec<SummaryRow>,

    /// Skipped years and why.
    pub gaps: BTreeMap<i32, String>,
}

impl SeriesSummary {
    /// Summarize a series.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanco_output::SeriesSummary;
    /// use balanco_ratios::{Indicator, IndicatorSet, Model, Series};
    ///
    /// let mut builder = Series::builder(Model::Ratios);
    /// let mut set = IndicatorSet::new();
    /// set.insert(Indicator::CurrentRatio, 1.75);
    /// builder.push(2023, set).unwrap();
    ///
    /// let summary = SeriesSummary::new("Ratios", &builder.finish());
    /// assert_eq!(summary.years, vec![2023]);
    /// assert_eq!(summary.rows[0].label, "Current ratio");
    /// ```
    pub fn new(title: impl Into<String>, series: &Series) -> Self {
        let years: Vec<i32> = series.years().collect();
        let rows = series
            .indicators()
            .into_iter()
            .map(|indicator| {
                let label = registry::info_of(indicator)
                    .map_or(indicator.name(), |info| info.label)
                    .to_string();
                SummaryRow {
                    name: indicator.name().to_string(),
                    label,
                    decimals: indicator.precision().decimals().max(0) as usize,
                    values: years
                        .iter()
                        .map(|year| series.value(*year, indicator))
                        .collect(),
                }
            })
            .collect();

        Self {
            title: title.into(),
            model: series.model(),
            years,
            rows,
            gaps: series.gaps().clone(),
        }
    }

    fn width(&self) -> usize {
        (LABEL_WIDTH + self.years.len() * (CELL_WIDTH + 1)).max(80)
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let width = self.width();
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", self.title));
        output.push_str(&"=".repeat(width));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("  No fiscal year could be computed.\n");
        } else {
            output.push_str(&format!("{:<LABEL_WIDTH$}", "Indicator"));
            for year in &self.years {
                output.push_str(&format!(" {:>CELL_WIDTH$}", year));
            }
            output.push('\n');
            output.push_str(&"-".repeat(width));
            output.push('\n');

            for row in &self.rows {
                output.push_str(&format!("{:<LABEL_WIDTH$}", row.label));
                for index in 0..self.years.len() {
                    output.push_str(&format!(" {:>CELL_WIDTH$}", row.cell(index)));
                }
                output.push('\n');
            }
        }

        if !self.gaps.is_empty() {
            output.push_str("\nSkipped years:\n");
            output.push_str(&"-".repeat(width));
            output.push('\n');
            for (year, reason) in &self.gaps {
                output.push_str(&format!("  {}: {}\n", year, reason));
            }
        }

        output.push_str(&"=".repeat(width));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("## {}\n\n", self.title));

        output.push_str("| Indicator |");
        for year in &self.years {
            output.push_str(&format!(" {} |", year));
        }
        output.push('\n');
        output.push_str("|-----------|");
        for _ in &self.years {
            output.push_str("------:|");
        }
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!("| {} |", row.label));
            for index in 0..self.years.len() {
                output.push_str(&format!(" {} |", row.cell(index)));
            }
            output.push('\n');
        }

        if !self.gaps.is_empty() {
            output.push('\n');
            for (year, reason) in &self.gaps {
                output.push_str(&format!("- **{}** skipped: {}\n", year, reason));
            }
        }

        output
    }
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = match (self.years.first(), self.years.last()) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "no years".to_string(),
        };
        writeln!(f, "{} ({})", self.title, span)?;
        writeln!(f, "  Indicators: {}", self.rows.len())?;
        writeln!(f, "  Skipped years: {}", self.gaps.len())?;
        Ok(())
    }
}

/// Title of a model's table.
pub const fn model_title(model: Model) -> &'static str {
    match model {
        Model::Ratios => "Financial Ratios",
        Model::TraditionalDupont => "Traditional DuPont",
        Model::AdjustedDupont => "Adjusted DuPont",
    }
}

/// Summaries of all three series of an analysis, in model order.
pub fn summarize_analysis(analysis: &Analysis) -> Vec<SeriesSummary> {
    Model::ALL
        .iter()
        .map(|model| {
            let title = format!(
                "{}: company {} ({} to {})",
                model_title(*model),
                analysis.company,
                analysis.from,
                analysis.to
            );
            SeriesSummary::new(title, analysis.series(*model))
        })
        .collect()
}
