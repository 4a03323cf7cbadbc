use std::path::PathBuf;
use std::process::ExitCode;
use ticker_analysis::{format_top, AnalysisPipeline, TextChartRenderer, DEFAULT_LABELLED_FILE};
use wsb_core::{AnalysisConfig, CoreError};

fn main() -> ExitCode {
    wsb_sentiment::init();
    wsb_sentiment::finish(run())
}

fn run() -> Result<(), CoreError> {
    let dataset = wsb_sentiment::positional_argument(std::env::args().skip(1))?
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LABELLED_FILE));

    let config = AnalysisConfig::load()?;
    let top_n = config.top_n;
    let pipeline = AnalysisPipeline::new(config);
    let mut renderer = TextChartRenderer::stdout();
    let summary = pipeline.run_distribution(&dataset, Some(&mut renderer))?;

    if let Some(path) = &summary.files.histogram {
        println!("Sentiment distribution saved to {}", path.display());
    }
    print!("{}", format_top(&summary.table, top_n));
    Ok(())
}
