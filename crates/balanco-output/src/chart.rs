//! Plotting collaborator for finished series.
//!
//! The engine hands a finished [`Series`] to a [`Plotter`] and moves on:
//! rendering never reports back. [`TerminalChart`] draws one horizontal bar
//! chart per indicator.

use balanco_ratios::{Indicator, IndicatorValue, Series, registry};
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::warn;

/// Renders a series. Fire-and-forget.
pub trait Plotter {
    /// Render `series` under `title`.
    fn render(&self, series: &Series, title: &str);
}

/// Horizontal bar charts written to any [`Write`] sink.
pub struct TerminalChart {
    sink: Mutex<Box<dyn Write + Send>>,
    bar_width: usize,
    indicators: Option<Vec<Indicator>>,
}

impl std::fmt::Debug for TerminalChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalChart")
            .field("bar_width", &self.bar_width)
            .field("indicators", &self.indicators)
            .finish_non_exhaustive()
    }
}

impl TerminalChart {
    /// Chart writing to `sink`.
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
            bar_width: 40,
            indicators: None,
        }
    }

    /// Chart writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Set the length of the longest bar, in characters.
    pub fn with_bar_width(mut self, bar_width: usize) -> Self {
        self.bar_width = bar_width.max(1);
        self
    }

    /// Only chart these indicators.
    pub fn with_indicators(mut self, indicators: Vec<Indicator>) -> Self {
        self.indicators = Some(indicators);
        self
    }

    /// Draw every selected indicator of `series` to `out`.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the writer.
    pub fn draw<W: Write + ?Sized>(
        &self,
        series: &Series,
        title: &str,
        out: &mut W,
    ) -> io::Result<()> {
        writeln!(out, "{}", title)?;
        writeln!(out, "{}", "=".repeat(title.len().max(20)))?;

        let indicators = self
            .indicators
            .clone()
            .unwrap_or_else(|| series.indicators());

        for indicator in indicators {
            let points = series.values(indicator);
            if points.is_empty() {
                continue;
            }

            let label = registry::info_of(indicator).map_or(indicator.name(), |info| info.label);
            writeln!(out)?;
            writeln!(out, "{}", label)?;

            let scale = points
                .iter()
                .filter_map(|(_, value)| value.finite())
                .map(f64::abs)
                .fold(0.0_f64, f64::max);

            for (year, value) in points {
                match value {
                    IndicatorValue::Finite(amount) => {
                        let length = if scale > 0.0 {
                            ((amount.abs() / scale) * self.bar_width as f64).round() as usize
                        } else {
                            0
                        };
                        let glyph = if amount < 0.0 { "░" } else { "█" };
                        writeln!(out, "  {} | {} {}", year, glyph.repeat(length), amount)?;
                    }
                    IndicatorValue::Unbounded => {
                        writeln!(out, "  {} | {}", year, IndicatorValue::SENTINEL)?;
                    }
                }
            }
        }

        for (year, reason) in series.gaps() {
            writeln!(out, "  {} skipped: {}", year, reason)?;
        }

        out.flush()
    }
}

impl Plotter for TerminalChart {
    fn render(&self, series: &Series, title: &str) {
        let Ok(mut sink) = self.sink.lock() else {
            warn!(title, "chart sink is poisoned, skipping render");
            return;
        };
        if let Err(e) = self.draw(series, title, &mut **sink) {
            warn!(title, error = %e, "failed to render chart");
        }
    }
}
