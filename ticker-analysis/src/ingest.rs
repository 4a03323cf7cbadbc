use crate::extractor::TickerExtractor;
use sentiment_engine::SentimentScorer;
use tracing::{debug, info};
use wsb_core::{CategoryPolicy, Comment, ContentSource, CoreError, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub limit: usize,
    pub include_comments: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            include_comments: true,
        }
    }
}

/// Turns raw submissions into scored [`Post`]s, one submission at a time.
pub struct Ingestor<'a, A> {
    scorer: &'a A,
    extractor: &'a TickerExtractor,
    policy: CategoryPolicy,
}

impl<'a, A: SentimentScorer> Ingestor<'a, A> {
    pub fn new(scorer: &'a A, extractor: &'a TickerExtractor, policy: CategoryPolicy) -> Self {
        Self {
            scorer,
            extractor,
            policy,
        }
    }

    /// Builds a post from a title/body pair with an already known sentiment.
    pub fn post_with_sentiment(&self, title: &str, body: &str, score: i64, sentiment: f64) -> Post {
        let text = format!("{} {}", title, body);
        let tickers = self.extractor.extract(&text);
        Post::new(title, body, score, sentiment, self.policy, tickers)
    }

    pub fn score_comment(&self, body: &str) -> Comment {
        Comment::new(body, self.scorer.compound(body), self.policy)
    }

    pub async fn ingest<S: ContentSource>(
        &self,
        source: &mut S,
        options: IngestOptions,
    ) -> Result<Vec<Post>, CoreError> {
        let submissions = source.fetch_submissions(options.limit).await?;
        info!("Fetched {} submissions", submissions.len());

        let mut posts = Vec::with_capacity(submissions.len());
        for submission in &submissions {
            let text = submission.combined_text();
            let sentiment = self.scorer.compound(&text);
            let post = self.post_with_sentiment(
                &submission.title,
                &submission.selftext,
                submission.score,
                sentiment,
            );

            let post = if options.include_comments {
                let comments: Vec<Comment> = source
                    .fetch_comments(submission)
                    .await?
                    .iter()
                    .map(|raw| self.score_comment(&raw.body))
                    .collect();
                debug!("Post {} has {} comments", submission.id, comments.len());
                post.with_comments(comments)
            } else {
                post
            };
            posts.push(post);
        }

        Ok(posts)
    }
}
