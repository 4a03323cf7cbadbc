use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A submission as handed over by the content source, before scoring.
#[derive(Debug, Clone)]
pub struct RawSubmission {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub score: i64,
    pub num_comments: u32,
    pub created_at: Option<DateTime<Utc>>,
}

impl RawSubmission {
    /// Title and body joined the way they are scanned and scored.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.selftext)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComment {
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentCategory {
    Bearish,
    Neutral,
    Bullish,
}

impl SentimentCategory {
    /// Column order used by every histogram.
    pub const ALL: [SentimentCategory; 3] = [
        SentimentCategory::Bearish,
        SentimentCategory::Neutral,
        SentimentCategory::Bullish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentCategory::Bearish => "Bearish",
            SentimentCategory::Neutral => "Neutral",
            SentimentCategory::Bullish => "Bullish",
        }
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a compound score onto a [`SentimentCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// Sign split: `compound >= 0` is bullish, anything below is bearish.
    Binary,
    /// Scores within `neutral_band` of zero (inclusive) are neutral.
    ThreeWay {
        #[serde(default)]
        neutral_band: f64,
    },
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        CategoryPolicy::ThreeWay { neutral_band: 0.0 }
    }
}

impl CategoryPolicy {
    pub fn categorize(&self, compound: f64) -> SentimentCategory {
        match *self {
            CategoryPolicy::Binary => {
                if compound >= 0.0 {
                    SentimentCategory::Bullish
                } else {
                    SentimentCategory::Bearish
                }
            }
            CategoryPolicy::ThreeWay { neutral_band } => {
                if compound > neutral_band {
                    SentimentCategory::Bullish
                } else if compound < -neutral_band {
                    SentimentCategory::Bearish
                } else {
                    SentimentCategory::Neutral
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub sentiment: f64,
    pub category: SentimentCategory,
}

impl Comment {
    pub fn new(text: impl Into<String>, sentiment: f64, policy: CategoryPolicy) -> Self {
        Self {
            text: text.into(),
            sentiment,
            category: policy.categorize(sentiment),
        }
    }
}

/// A scored submission. `tickers` is an ordered set: first-seen order, no repeats.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub title: String,
    pub body: String,
    pub score: i64,
    pub sentiment: f64,
    pub category: SentimentCategory,
    pub tickers: Vec<String>,
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        score: i64,
        sentiment: f64,
        policy: CategoryPolicy,
        tickers: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            score,
            sentiment,
            category: policy.categorize(sentiment),
            tickers: dedup_preserving_order(tickers),
            comments: Vec::new(),
        }
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }
}

fn dedup_preserving_order(tickers: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(tickers.len());
    tickers
        .into_iter()
        .filter(|ticker| seen.insert(ticker.clone()))
        .collect()
}

/// One row of the ticker table. Only ever built with `mentions >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub ticker: String,
    pub mentions: u64,
    pub total_sentiment: f64,
    pub avg_sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunWarning {
    #[error("No tickers found in {posts} posts; tables exported empty")]
    EmptyResult { posts: usize },
}

/// Producer of raw submissions and their comments.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// Up to `limit` newest submissions from the configured channel.
    async fn fetch_submissions(&mut self, limit: usize) -> Result<Vec<RawSubmission>, CoreError>;

    async fn fetch_comments(
        &mut self,
        submission: &RawSubmission,
    ) -> Result<Vec<RawComment>, CoreError>;
}
