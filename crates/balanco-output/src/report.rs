//! Report generation for balanco analyses.

use crate::summary::summarize_analysis;
use balanco_ratios::Analysis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The builder was not given an analysis.
    #[error("Report has no analysis")]
    MissingAnalysis,
}

/// An analysis stamped with its generation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Company being analyzed.
    pub company: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Free-form notes, such as the data source.
    pub notes: Vec<String>,

    /// The analyzed series.
    pub analysis: Analysis,
}

impl Report {
    /// Create a new report.
    pub fn new(analysis: Analysis) -> Self {
        Self {
            company: analysis.company.clone(),
            timestamp: Utc::now(),
            notes: Vec::new(),
            analysis,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to a file.
    pub fn write_json(&self, path: &std::path::Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Format as Markdown, one table per model.
    pub fn to_markdown(&self) -> String {
        let mut output = format!(
            "# Company {}: {} to {}\n\n_Generated {}_\n\n",
            self.company,
            self.analysis.from,
            self.analysis.to,
            self.timestamp.format("%Y-%m-%d %H:%M UTC")
        );
        for note in &self.notes {
            output.push_str(&format!("> {}\n", note));
        }
        if !self.notes.is_empty() {
            output.push('\n');
        }
        for summary in summarize_analysis(&self.analysis) {
            output.push_str(&summary.to_markdown());
            output.push('\n');
        }
        output
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    analysis: Option<Analysis>,
    notes: Vec<String>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the analysis.
    pub fn analysis(mut self, analysis: Analysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Add a note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        let mut report = Report::new(self.analysis.ok_or(ReportError::MissingAnalysis)?);
        report.notes = self.notes;
        Ok(report)
    }
}
