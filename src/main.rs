use reddit_client::{RedditClient, RedditClientConfig};
use std::process::ExitCode;
use ticker_analysis::{format_top, lexicon_scorer, AnalysisPipeline, TextChartRenderer};
use tracing::info;
use wsb_core::{AnalysisConfig, CoreError, RedditCredentials};

const DEFAULT_LIMIT: usize = 100;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    wsb_sentiment::init();
    wsb_sentiment::finish(run().await)
}

async fn run() -> Result<(), CoreError> {
    let argument = wsb_sentiment::positional_argument(std::env::args().skip(1))?;
    let limit = wsb_sentiment::parse_limit(argument.as_deref(), DEFAULT_LIMIT)?;

    let config = AnalysisConfig::load()?;
    let credentials = RedditCredentials::from_env()?;
    let client_config = RedditClientConfig::new(credentials)?
        .with_subreddit(config.subreddit.as_str())
        .with_sort(config.sort.as_str())
        .with_comment_limit(config.comment_limit);
    let mut client = RedditClient::new(client_config)?;
    let scorer = lexicon_scorer(&config)?;

    info!(
        "Scraping {} posts from r/{} ({})",
        limit, config.subreddit, config.sort
    );
    let top_n = config.top_n;
    let pipeline = AnalysisPipeline::new(config);
    let mut renderer = TextChartRenderer::stdout();
    let summary = pipeline
        .run_scrape(&mut client, &scorer, limit, Some(&mut renderer))
        .await?;

    if let Some(path) = &summary.files.ticker_table {
        println!("Ticker analysis saved to {}", path.display());
    }
    print!("{}", format_top(&summary.table, top_n));
    Ok(())
}
