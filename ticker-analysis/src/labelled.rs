use crate::extractor::TickerExtractor;
use std::io::Read;
use std::path::Path;
use tracing::info;
use wsb_core::{CategoryPolicy, CoreError, ExportError, Post, SentimentError};

pub const DEFAULT_LABELLED_FILE: &str = "Reddit_wsb_labelled.csv";

const TEXT_COLUMN: &str = "text";
const LABEL_COLUMN: &str = "sentiment";

/// Hand-labelled rows: `-1` bearish, `0` neutral, `1` bullish.
pub fn load_labelled(path: &Path, extractor: &TickerExtractor) -> Result<Vec<Post>, CoreError> {
    let file = std::fs::File::open(path).map_err(|e| ExportError::ReadFailed {
        path: path.display().to_string(),
        source: csv::Error::from(e),
    })?;
    let posts = parse_labelled(file, extractor).map_err(|e| match e {
        CoreError::Export(ExportError::ReadFailed { source, .. }) => ExportError::ReadFailed {
            path: path.display().to_string(),
            source,
        }
        .into(),
        other => other,
    })?;
    info!("Loaded {} labelled rows from {}", posts.len(), path.display());
    Ok(posts)
}

pub fn parse_labelled<R: Read>(
    input: R,
    extractor: &TickerExtractor,
) -> Result<Vec<Post>, CoreError> {
    let read_failed = |source: csv::Error| ExportError::ReadFailed {
        path: "<labelled input>".to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers().map_err(read_failed)?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| CoreError::InvalidInput {
                message: format!("labelled dataset has no '{}' column", name),
            })
    };
    let text_at = column(TEXT_COLUMN)?;
    let label_at = column(LABEL_COLUMN)?;

    // Labels are categories already; the zero band maps -1/0/1 onto them exactly.
    let policy = CategoryPolicy::default();
    let mut posts = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(read_failed)?;
        let text = record.get(text_at).unwrap_or_default();
        let raw_label = record.get(label_at).unwrap_or_default().trim();
        let label = raw_label
            .parse::<f64>()
            .ok()
            .filter(|label| (-1.0..=1.0).contains(label))
            .ok_or_else(|| SentimentError::InvalidLabel {
                row: index + 1,
                value: raw_label.to_string(),
            })?;

        posts.push(Post::new(text, "", 0, label, policy, extractor.extract(text)));
    }
    Ok(posts)
}
