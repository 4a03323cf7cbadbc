pub mod aggregator;
pub mod chart;
pub mod exporter;
pub mod extractor;
pub mod ingest;
pub mod labelled;
pub mod pipeline;


pub use aggregator::{
    aggregate, CategoryCounts, SentimentHistogram, TickerAccumulator, TickerTable,
};
pub use chart::{ChartRenderer, TextChartRenderer};
pub use exporter::{
    export, format_top, read_ticker_table, ExportedFiles, PostsWithComments, ReportExporter,
    StagedExport, Tabular, DISTRIBUTION_FILE, POSTS_WITH_COMMENTS_FILE, TICKER_ANALYSIS_FILE,
};
pub use extractor::TickerExtractor;
pub use ingest::{IngestOptions, Ingestor};
pub use labelled::{load_labelled, parse_labelled, DEFAULT_LABELLED_FILE};
pub use pipeline::{lexicon_scorer, AnalysisPipeline, RunSummary};
