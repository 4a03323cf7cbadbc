use crate::aggregator::{aggregate, SentimentHistogram, TickerTable};
use crate::chart::ChartRenderer;
use crate::exporter::{
    ExportedFiles, PostsWithComments, ReportExporter, DISTRIBUTION_FILE, POSTS_WITH_COMMENTS_FILE,
    TICKER_ANALYSIS_FILE,
};
use crate::extractor::TickerExtractor;
use crate::ingest::{IngestOptions, Ingestor};
use crate::labelled::load_labelled;
use sentiment_engine::{LexiconScorer, SentimentScorer};
use std::path::Path;
use tracing::info;
use wsb_core::{AnalysisConfig, ContentSource, CoreError, ErrorReporter, Post, RunWarning};

/// The lexicon scorer, extended with the configured lexicon file when one is set.
pub fn lexicon_scorer(config: &AnalysisConfig) -> Result<LexiconScorer, CoreError> {
    match &config.sentiment_lexicon {
        Some(path) => LexiconScorer::with_lexicon_file(path),
        None => Ok(LexiconScorer::default()),
    }
}

/// Result of one batch run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub posts: usize,
    pub table: TickerTable,
    pub histogram: SentimentHistogram,
    pub files: ExportedFiles,
    pub warnings: Vec<RunWarning>,
}

/// Ingest, aggregate, export and render, configured once up front.
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    reporter: ErrorReporter,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            reporter: ErrorReporter::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Scrape mode: newest `limit` submissions from `source`, scored with `scorer`.
    pub async fn run_scrape<S, A>(
        &self,
        source: &mut S,
        scorer: &A,
        limit: usize,
        renderer: Option<&mut dyn ChartRenderer>,
    ) -> Result<RunSummary, CoreError>
    where
        S: ContentSource,
        A: SentimentScorer,
    {
        let exporter = ReportExporter::new(&self.config.output_dir)?;
        let extractor = TickerExtractor::new(&self.config.extractor)?;
        let ingestor = Ingestor::new(scorer, &extractor, self.config.category_policy);
        let options = IngestOptions {
            limit,
            include_comments: self.config.include_comments,
        };

        let posts = ingestor.ingest(source, options).await?;
        self.report(&posts, &exporter, renderer, true)
    }

    /// Labelled-dataset mode: the label on each row is its sentiment.
    pub fn run_distribution(
        &self,
        dataset: &Path,
        renderer: Option<&mut dyn ChartRenderer>,
    ) -> Result<RunSummary, CoreError> {
        let exporter = ReportExporter::new(&self.config.output_dir)?;
        let extractor = TickerExtractor::new(&self.config.labelled_extractor)?;
        let posts = load_labelled(dataset, &extractor)?;
        self.report(&posts, &exporter, renderer, false)
    }

    fn report(
        &self,
        posts: &[Post],
        exporter: &ReportExporter,
        renderer: Option<&mut dyn ChartRenderer>,
        with_posts: bool,
    ) -> Result<RunSummary, CoreError> {
        let (table, histogram) = aggregate(posts);
        info!(
            "Aggregated {} posts into {} tickers",
            posts.len(),
            table.len()
        );

        let mut warnings = Vec::new();
        if table.is_empty() {
            let warning = RunWarning::EmptyResult { posts: posts.len() };
            self.reporter.report_warning(&warning);
            warnings.push(warning);
        }

        let mut batch = exporter.stage();
        let files = ExportedFiles {
            ticker_table: Some(batch.add(&table, TICKER_ANALYSIS_FILE)?),
            histogram: Some(batch.add(&histogram, DISTRIBUTION_FILE)?),
            posts: if with_posts {
                Some(batch.add(&PostsWithComments(posts), POSTS_WITH_COMMENTS_FILE)?)
            } else {
                None
            },
        };
        batch.commit()?;

        if let Some(renderer) = renderer.filter(|_| self.config.render_charts) {
            renderer.render(&table, &histogram)?;
        }

        Ok(RunSummary {
            posts: posts.len(),
            table,
            histogram,
            files,
            warnings,
        })
    }
}
