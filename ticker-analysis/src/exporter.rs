use crate::aggregator::{SentimentHistogram, TickerTable};
use serde::Deserialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use wsb_core::{CoreError, ExportError, Post, SentimentCategory, TickerRecord};

pub const TICKER_ANALYSIS_FILE: &str = "ticker_analysis.csv";
pub const DISTRIBUTION_FILE: &str = "stock_sentiment_distribution.csv";
pub const POSTS_WITH_COMMENTS_FILE: &str = "posts_with_comments.csv";

/// A table with a fixed header that flattens into string records.
pub trait Tabular {
    fn headers(&self) -> Vec<&'static str>;
    fn records(&self) -> Vec<Vec<String>>;
}

impl Tabular for TickerTable {
    fn headers(&self) -> Vec<&'static str> {
        vec!["ticker", "mentions", "avg_sentiment"]
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                vec![
                    row.ticker.clone(),
                    row.mentions.to_string(),
                    row.avg_sentiment.to_string(),
                ]
            })
            .collect()
    }
}

impl Tabular for SentimentHistogram {
    fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec!["ticker"];
        headers.extend(SentimentCategory::ALL.iter().map(|c| c.as_str()));
        headers
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|(ticker, counts)| {
                let mut record = vec![ticker.clone()];
                record.extend(
                    SentimentCategory::ALL
                        .iter()
                        .map(|c| counts.get(*c).to_string()),
                );
                record
            })
            .collect()
    }
}

/// Every (post, comment) pair; a post without comments gets one row with blank comment cells.
pub struct PostsWithComments<'a>(pub &'a [Post]);

impl Tabular for PostsWithComments<'_> {
    fn headers(&self) -> Vec<&'static str> {
        vec![
            "title",
            "post_sentiment",
            "post_sentiment_category",
            "ticker_mentions",
            "comment_text",
            "comment_sentiment",
            "comment_sentiment_category",
        ]
    }

    fn records(&self) -> Vec<Vec<String>> {
        let mut records = Vec::new();
        for post in self.0 {
            let post_cells = [
                post.title.clone(),
                post.sentiment.to_string(),
                post.category.to_string(),
                post.tickers.join(","),
            ];
            if post.comments.is_empty() {
                let mut record = post_cells.to_vec();
                record.extend([String::new(), String::new(), String::new()]);
                records.push(record);
            }
            for comment in &post.comments {
                let mut record = post_cells.to_vec();
                record.extend([
                    comment.text.clone(),
                    comment.sentiment.to_string(),
                    comment.category.to_string(),
                ]);
                records.push(record);
            }
        }
        records
    }
}

fn write_table<T: Tabular + ?Sized, W: io::Write>(
    table: &T,
    destination: W,
) -> Result<usize, csv::Error> {
    let mut writer = csv::Writer::from_writer(destination);
    writer.write_record(table.headers())?;
    let records = table.records();
    for record in &records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(records.len())
}

fn write_failed(path: &Path, source: impl Into<csv::Error>) -> CoreError {
    ExportError::WriteFailed {
        path: path.display().to_string(),
        source: source.into(),
    }
    .into()
}

/// Writes the header and then one record per row, replacing any existing file.
pub fn export<T: Tabular + ?Sized>(table: &T, destination: &Path) -> Result<(), CoreError> {
    let file = File::create(destination).map_err(|e| write_failed(destination, e))?;
    let rows = write_table(table, file).map_err(|e| write_failed(destination, e))?;
    debug!("Wrote {} rows to {}", rows, destination.display());
    Ok(())
}

#[derive(Debug, Deserialize)]
struct TickerRow {
    ticker: String,
    mentions: u64,
    avg_sentiment: f64,
}

/// Reads a `ticker_analysis.csv` back into a table.
pub fn read_ticker_table(path: &Path) -> Result<TickerTable, CoreError> {
    let read_failed = |source: csv::Error| ExportError::ReadFailed {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_failed)?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<TickerRow>() {
        let row = result.map_err(read_failed)?;
        rows.push(TickerRecord {
            total_sentiment: row.avg_sentiment * row.mentions as f64,
            ticker: row.ticker,
            mentions: row.mentions,
            avg_sentiment: row.avg_sentiment,
        });
    }
    Ok(TickerTable { rows })
}

/// The first `n` ticker rows as an aligned plain-text table.
pub fn format_top(table: &TickerTable, n: usize) -> String {
    let rows = table.top(n);
    let width = rows
        .iter()
        .map(|row| row.ticker.len())
        .max()
        .unwrap_or(0)
        .max("ticker".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>8}  {:>13}", "ticker", "mentions", "avg_sentiment");
    for row in rows {
        let _ = writeln!(
            out,
            "{:<width$}  {:>8}  {:>13.6}",
            row.ticker, row.mentions, row.avg_sentiment
        );
    }
    out
}

/// Paths written by one export pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportedFiles {
    pub ticker_table: Option<PathBuf>,
    pub histogram: Option<PathBuf>,
    pub posts: Option<PathBuf>,
}

/// Writes the report files into one output directory.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    output_dir: PathBuf,
}

impl ReportExporter {
    /// Creates the directory if needed and fails early when it is not usable.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let output_dir = output_dir.into();
        let not_writable = || ExportError::DirectoryNotWritable {
            path: output_dir.display().to_string(),
        };
        std::fs::create_dir_all(&output_dir).map_err(|_| not_writable())?;
        let metadata = std::fs::metadata(&output_dir).map_err(|_| not_writable())?;
        if !metadata.is_dir() || metadata.permissions().readonly() {
            return Err(not_writable().into());
        }
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    pub fn export_ticker_table(&self, table: &TickerTable) -> Result<PathBuf, CoreError> {
        self.write(table, TICKER_ANALYSIS_FILE)
    }

    pub fn export_histogram(&self, histogram: &SentimentHistogram) -> Result<PathBuf, CoreError> {
        self.write(histogram, DISTRIBUTION_FILE)
    }

    pub fn export_posts(&self, posts: &[Post]) -> Result<PathBuf, CoreError> {
        self.write(&PostsWithComments(posts), POSTS_WITH_COMMENTS_FILE)
    }

    /// Starts a set of files that become visible together on `commit`.
    pub fn stage(&self) -> StagedExport<'_> {
        StagedExport {
            exporter: self,
            staged: Vec::new(),
        }
    }

    fn write<T: Tabular + ?Sized>(&self, table: &T, file_name: &str) -> Result<PathBuf, CoreError> {
        let mut batch = self.stage();
        let path = batch.add(table, file_name)?;
        batch.commit()?;
        Ok(path)
    }
}

/// Report files written to temporary files in the output directory.
///
/// Nothing appears under the final names until `commit` succeeds for every
/// file. Dropping the batch removes the temporaries.
pub struct StagedExport<'a> {
    exporter: &'a ReportExporter,
    staged: Vec<(PathBuf, NamedTempFile)>,
}

impl StagedExport<'_> {
    /// Writes `table` to a temporary file destined for `file_name`.
    pub fn add<T: Tabular + ?Sized>(
        &mut self,
        table: &T,
        file_name: &str,
    ) -> Result<PathBuf, CoreError> {
        let path = self.exporter.path_for(file_name);
        let mut temp = NamedTempFile::new_in(self.exporter.output_dir())
            .map_err(|e| write_failed(&path, e))?;
        let rows = write_table(table, temp.as_file_mut()).map_err(|e| write_failed(&path, e))?;
        debug!("Staged {} rows for {}", rows, path.display());
        self.staged.push((path.clone(), temp));
        Ok(path)
    }

    /// Moves every staged file into place. On failure the files already moved are removed again.
    pub fn commit(self) -> Result<Vec<PathBuf>, CoreError> {
        let mut committed: Vec<PathBuf> = Vec::with_capacity(self.staged.len());
        for (path, temp) in self.staged {
            if let Err(e) = temp.persist(&path) {
                for done in &committed {
                    if let Err(remove) = std::fs::remove_file(done) {
                        warn!("Could not remove {}: {}", done.display(), remove);
                    }
                }
                return Err(write_failed(&path, io::Error::from(e)));
            }
            info!("Exported {}", path.display());
            committed.push(path);
        }
        Ok(committed)
    }
}
