use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use wsb_core::{Post, SentimentCategory, TickerRecord};

/// Running per-ticker totals, in first-encounter order.
#[derive(Debug, Default, Clone)]
pub struct TickerAccumulator {
    index: HashMap<String, usize>,
    totals: Vec<(String, u64, f64)>,
}

impl TickerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post sentiment only. Comments never count towards a ticker here.
    pub fn add_post(mut self, post: &Post) -> Self {
        for ticker in &post.tickers {
            let slot = match self.index.get(ticker) {
                Some(&slot) => slot,
                None => {
                    self.index.insert(ticker.clone(), self.totals.len());
                    self.totals.push((ticker.clone(), 0, 0.0));
                    self.totals.len() - 1
                }
            };
            let entry = &mut self.totals[slot];
            entry.1 += 1;
            entry.2 += post.sentiment;
        }
        self
    }

    pub fn finish(self) -> TickerTable {
        let mut rows: Vec<TickerRecord> = self
            .totals
            .into_iter()
            .map(|(ticker, mentions, total_sentiment)| TickerRecord {
                ticker,
                mentions,
                total_sentiment,
                avg_sentiment: total_sentiment / mentions as f64,
            })
            .collect();
        // Stable: equal counts keep first-encounter order.
        rows.sort_by(|a, b| b.mentions.cmp(&a.mentions));
        TickerTable { rows }
    }
}

/// Ticker rows sorted by descending mention count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerTable {
    pub rows: Vec<TickerRecord>,
}

impl TickerTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerRecord> {
        self.rows.iter().find(|row| row.ticker == ticker)
    }

    pub fn top(&self, n: usize) -> &[TickerRecord] {
        &self.rows[..n.min(self.rows.len())]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    #[serde(rename = "Bearish")]
    pub bearish: u64,
    #[serde(rename = "Neutral")]
    pub neutral: u64,
    #[serde(rename = "Bullish")]
    pub bullish: u64,
}

impl CategoryCounts {
    pub fn add(&mut self, category: SentimentCategory) {
        match category {
            SentimentCategory::Bearish => self.bearish += 1,
            SentimentCategory::Neutral => self.neutral += 1,
            SentimentCategory::Bullish => self.bullish += 1,
        }
    }

    pub fn get(&self, category: SentimentCategory) -> u64 {
        match category {
            SentimentCategory::Bearish => self.bearish,
            SentimentCategory::Neutral => self.neutral,
            SentimentCategory::Bullish => self.bullish,
        }
    }

    pub fn total(&self) -> u64 {
        self.bearish + self.neutral + self.bullish
    }
}

/// Sentiment categories per ticker, keyed alphabetically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentHistogram {
    pub rows: BTreeMap<String, CategoryCounts>,
}

impl SentimentHistogram {
    /// Counts each comment of a post, or the post itself when it has none.
    pub fn add_post(&mut self, post: &Post) {
        for ticker in &post.tickers {
            let counts = self.rows.entry(ticker.clone()).or_default();
            if post.comments.is_empty() {
                counts.add(post.category);
            } else {
                for comment in &post.comments {
                    counts.add(comment.category);
                }
            }
        }
    }

    pub fn get(&self, ticker: &str) -> CategoryCounts {
        self.rows.get(ticker).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn aggregate(posts: &[Post]) -> (TickerTable, SentimentHistogram) {
    let table = posts
        .iter()
        .fold(TickerAccumulator::new(), TickerAccumulator::add_post)
        .finish();

    let mut histogram = SentimentHistogram::default();
    for post in posts {
        histogram.add_post(post);
    }

    (table, histogram)
}
