//! Terminal bar charts for the aggregated tables.

use crate::aggregator::{SentimentHistogram, TickerTable};
use std::io::{self, Write};
use wsb_core::{CoreError, ExportError, SentimentCategory};

pub const DEFAULT_BAR_WIDTH: usize = 40;

/// Consumer of the aggregated tables.
pub trait ChartRenderer {
    /// One chart per ticker histogram, then one of mention frequency.
    fn render(
        &mut self,
        table: &TickerTable,
        histogram: &SentimentHistogram,
    ) -> Result<(), CoreError>;
}

/// Draws ASCII bar charts into any writer.
pub struct TextChartRenderer<W: Write> {
    out: W,
    bar_width: usize,
}

impl TextChartRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextChartRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }

    pub fn with_bar_width(mut self, bar_width: usize) -> Self {
        self.bar_width = bar_width.max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn bar_chart(&mut self, title: &str, bars: &[(String, u64)]) -> io::Result<()> {
        writeln!(self.out, "\n{}", title)?;
        writeln!(self.out, "{}", "=".repeat(title.len()))?;

        let max = bars.iter().map(|(_, v)| *v).max().unwrap_or(0);
        let label_width = bars.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        for (label, value) in bars {
            let len = if max == 0 {
                0
            } else {
                (*value as f64 / max as f64 * self.bar_width as f64).round() as usize
            };
            writeln!(
                self.out,
                "{:>label_width$} | {:<bar_width$} {}",
                label,
                "#".repeat(len),
                value,
                bar_width = self.bar_width
            )?;
        }
        Ok(())
    }

    fn draw(&mut self, table: &TickerTable, histogram: &SentimentHistogram) -> io::Result<()> {
        for (ticker, counts) in &histogram.rows {
            let bars: Vec<(String, u64)> = SentimentCategory::ALL
                .iter()
                .map(|c| (c.to_string(), counts.get(*c)))
                .collect();
            self.bar_chart(&format!("Sentiment distribution for {}", ticker), &bars)?;
        }

        let mut mentions: Vec<(String, u64)> = table
            .rows
            .iter()
            .map(|row| (row.ticker.clone(), row.mentions))
            .collect();
        mentions.sort_by(|a, b| b.1.cmp(&a.1));
        self.bar_chart("Ticker mention frequency", &mentions)?;
        self.out.flush()
    }
}

impl<W: Write> ChartRenderer for TextChartRenderer<W> {
    fn render(
        &mut self,
        table: &TickerTable,
        histogram: &SentimentHistogram,
    ) -> Result<(), CoreError> {
        self.draw(table, histogram).map_err(|e| {
            ExportError::RenderFailed {
                reason: e.to_string(),
            }
            .into()
        })
    }
}
