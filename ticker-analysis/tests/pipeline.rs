use std::fs;
use ticker_analysis::{
    aggregate, export, read_ticker_table, AnalysisPipeline, TextChartRenderer, DISTRIBUTION_FILE,
    TICKER_ANALYSIS_FILE,
};
use wsb_core::{AnalysisConfig, CategoryPolicy, CoreError, Post, SentimentError};

const LABELLED: &str = "\
title,text,sentiment
a,GME to the moon,1
b,gme and amc both dead,-1
c,,0
d,holding NVDA and gme,0
e,nothing to see,1
";

fn posts_fixture() -> Vec<Post> {
    let policy = CategoryPolicy::default();
    let rows: Vec<(Vec<&str>, f64)> = vec![
        (vec!["GME"], 0.5),
        (vec!["GME", "AMC"], -0.2),
        (vec!["NVDA"], 0.9),
        (vec![], 0.3),
        (vec!["AMC", "NVDA", "GME"], -0.7),
    ];
    rows.iter()
        .map(|(tickers, sentiment)| {
            Post::new(
                "",
                "",
                1,
                *sentiment,
                policy,
                tickers.iter().map(|t| t.to_string()).collect(),
            )
        })
        .collect()
}

#[test]
fn test_distribution_run_from_labelled_file() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("labelled.csv");
    fs::write(&dataset, LABELLED).unwrap();
    let config = AnalysisConfig {
        output_dir: dir.path().join("out"),
        ..AnalysisConfig::default()
    };
    let mut renderer = TextChartRenderer::new(Vec::new());

    let summary = AnalysisPipeline::new(config)
        .run_distribution(&dataset, Some(&mut renderer))
        .unwrap();

    assert_eq!(summary.posts, 5);
    let distribution = fs::read_to_string(dir.path().join("out").join(DISTRIBUTION_FILE)).unwrap();
    assert_eq!(
        distribution,
        "ticker,Bearish,Neutral,Bullish\nAMC,1,0,0\nGME,1,1,1\nNVDA,0,1,0\n"
    );
    assert!(summary.files.posts.is_none());
    assert_eq!(summary.table.rows[0].ticker, "GME");
    assert_eq!(summary.table.rows[0].mentions, 3);

    let charts = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(charts.contains("Sentiment distribution for NVDA"));
    assert!(charts.contains("Ticker mention frequency"));
}

#[test]
fn test_distribution_run_rejects_bad_label() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("labelled.csv");
    fs::write(&dataset, "text,sentiment\nGME,up\n").unwrap();
    let config = AnalysisConfig {
        output_dir: dir.path().to_path_buf(),
        ..AnalysisConfig::default()
    };

    let err = AnalysisPipeline::new(config)
        .run_distribution(&dataset, None)
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Sentiment(SentimentError::InvalidLabel { row: 1, .. })
    ));
    assert!(!dir.path().join(DISTRIBUTION_FILE).exists());
}

#[test]
fn test_aggregation_totals_do_not_depend_on_order() {
    let posts = posts_fixture();
    let mut reversed = posts.clone();
    reversed.reverse();

    let (forward, _) = aggregate(&posts);
    let (backward, _) = aggregate(&reversed);

    assert_eq!(forward.len(), backward.len());
    for row in &forward.rows {
        let other = backward.get(&row.ticker).unwrap();
        assert_eq!(row.mentions, other.mentions);
        assert!((row.total_sentiment - other.total_sentiment).abs() < 1e-12);
    }
}

#[test]
fn test_every_row_is_a_consistent_average() {
    let (table, histogram) = aggregate(&posts_fixture());

    for row in &table.rows {
        assert!(row.mentions >= 1);
        assert!((row.avg_sentiment - row.total_sentiment / row.mentions as f64).abs() < 1e-12);
    }
    let mentions: Vec<u64> = table.rows.iter().map(|r| r.mentions).collect();
    let mut sorted = mentions.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(mentions, sorted);
    // No comments anywhere, so histogram totals equal mention counts.
    for row in &table.rows {
        assert_eq!(histogram.get(&row.ticker).total(), row.mentions);
    }
}

#[test]
fn test_exported_table_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(TICKER_ANALYSIS_FILE);
    let (table, _) = aggregate(&posts_fixture());

    export(&table, &path).unwrap();
    let restored = read_ticker_table(&path).unwrap();

    let triples = |t: &ticker_analysis::TickerTable| {
        t.rows
            .iter()
            .map(|r| (r.ticker.clone(), r.mentions, r.avg_sentiment))
            .collect::<Vec<_>>()
    };
    for (a, b) in triples(&table).into_iter().zip(triples(&restored)) {
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
        assert!((a.2 - b.2).abs() < 1e-9);
    }
    assert_eq!(restored.len(), table.len());
}
