pub mod api;
pub mod auth;
pub mod rate_limiter;


pub use api::{RedditApiClient, RedditListing, RedditPostData, MAX_PAGE_SIZE};
pub use auth::{PasswordAuthenticator, RedditToken};
pub use rate_limiter::{RateLimitConfig, RateLimitStatus, RateLimiter};

use tracing::{debug, info, warn};
use url::Url;
use wsb_core::{ContentSource, CoreError, RawComment, RawSubmission, RedditCredentials};

#[derive(Debug, Clone)]
pub struct RedditEndpoints {
    pub auth_base: Url,
    pub api_base: Url,
}

impl RedditEndpoints {
    pub fn new(auth_base: &str, api_base: &str) -> Result<Self, CoreError> {
        let parse = |raw: &str| {
            Url::parse(raw).map_err(|e| CoreError::InvalidInput {
                message: format!("Invalid Reddit base URL '{}': {}", raw, e),
            })
        };
        Ok(Self {
            auth_base: parse(auth_base)?,
            api_base: parse(api_base)?,
        })
    }

    pub fn reddit() -> Result<Self, CoreError> {
        Self::new(api::REDDIT_AUTH_BASE, api::REDDIT_API_BASE)
    }
}

#[derive(Debug, Clone)]
pub struct RedditClientConfig {
    pub credentials: RedditCredentials,
    pub subreddit: String,
    pub sort: String,
    pub comment_limit: Option<u32>,
    pub endpoints: RedditEndpoints,
    pub rate_limit: RateLimitConfig,
}

impl RedditClientConfig {
    pub fn new(credentials: RedditCredentials) -> Result<Self, CoreError> {
        Ok(Self {
            credentials,
            subreddit: "wallstreetbets".to_string(),
            sort: "new".to_string(),
            comment_limit: None,
            endpoints: RedditEndpoints::reddit()?,
            rate_limit: RateLimitConfig::reddit_oauth(),
        })
    }

    pub fn with_subreddit(mut self, subreddit: impl Into<String>) -> Self {
        self.subreddit = subreddit.into();
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn with_comment_limit(mut self, limit: Option<u32>) -> Self {
        self.comment_limit = limit;
        self
    }

    pub fn with_endpoints(mut self, endpoints: RedditEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}

/// Reddit as a [`ContentSource`]. Authenticates lazily on first fetch.
pub struct RedditClient {
    subreddit: String,
    sort: String,
    comment_limit: Option<u32>,
    authenticator: PasswordAuthenticator,
    api: RedditApiClient,
    token: Option<RedditToken>,
}

impl RedditClient {
    pub fn new(config: RedditClientConfig) -> Result<Self, CoreError> {
        let authenticator =
            PasswordAuthenticator::new(&config.credentials, &config.endpoints.auth_base)?;
        let api = RedditApiClient::new(
            &config.credentials.user_agent,
            config.endpoints.api_base,
            config.rate_limit,
        )?;

        Ok(Self {
            subreddit: config.subreddit,
            sort: config.sort,
            comment_limit: config.comment_limit,
            authenticator,
            api,
            token: None,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_expired())
    }

    pub async fn authenticate(&mut self) -> Result<(), CoreError> {
        let token = self.authenticator.request_token().await?;
        info!("Authenticated with Reddit (scope: {})", token.scope.join(" "));
        self.token = Some(token);
        Ok(())
    }

    async fn access_token(&mut self) -> Result<String, CoreError> {
        if !self.is_authenticated() {
            if self.token.is_some() {
                debug!("Access token expired, requesting a new one");
            }
            self.authenticate().await?;
        }
        self.token
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or_else(|| CoreError::Internal {
                message: "access token missing after authentication".to_string(),
            })
    }

    /// Newest-first pagination until `limit` posts or the listing runs out.
    pub async fn fetch_posts(&mut self, limit: usize) -> Result<Vec<RawSubmission>, CoreError> {
        let mut submissions = Vec::with_capacity(limit);
        let mut after: Option<String> = None;

        while submissions.len() < limit {
            let token = self.access_token().await?;
            let remaining = limit - submissions.len();
            let listing = self
                .api
                .get_subreddit_posts(
                    &token,
                    &self.subreddit,
                    &self.sort,
                    remaining,
                    after.as_deref(),
                )
                .await?;

            let page_len = listing.data.children.len();
            submissions.extend(
                listing
                    .data
                    .children
                    .into_iter()
                    .take(remaining)
                    .map(|child| RawSubmission::from(child.data)),
            );

            after = listing.data.after;
            if page_len == 0 || after.is_none() {
                break;
            }
        }

        if submissions.len() < limit {
            warn!(
                "r/{} listing ended after {} of {} requested posts",
                self.subreddit,
                submissions.len(),
                limit
            );
        }
        Ok(submissions)
    }

    pub async fn get_rate_limit_status(&self) -> RateLimitStatus {
        self.api.get_rate_limit_status().await
    }
}

impl ContentSource for RedditClient {
    async fn fetch_submissions(&mut self, limit: usize) -> Result<Vec<RawSubmission>, CoreError> {
        self.fetch_posts(limit).await
    }

    async fn fetch_comments(
        &mut self,
        submission: &RawSubmission,
    ) -> Result<Vec<RawComment>, CoreError> {
        let token = self.access_token().await?;
        self.api
            .get_comments(&token, &submission.id, self.comment_limit)
            .await
    }
}
