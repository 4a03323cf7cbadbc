use crate::rate_limiter::{RateLimitConfig, RateLimitStatus, RateLimiter};
use chrono::DateTime;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;
use wsb_core::{CoreError, RawComment, RawSubmission, RedditApiError};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
pub const REDDIT_AUTH_BASE: &str = "https://www.reddit.com";

/// Reddit never returns more than this many children per listing page.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u32,
    #[serde(default)]
    pub stickied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub score: i64,
    /// Either an empty string or a nested listing of replies.
    #[serde(default)]
    pub replies: Value,
}

impl RedditCommentData {
    fn is_removed(&self) -> bool {
        matches!(self.body.as_str(), "[deleted]" | "[removed]")
    }
}

impl From<RedditPostData> for RawSubmission {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            title: post_data.title,
            selftext: post_data.selftext,
            score: post_data.score,
            num_comments: post_data.num_comments,
            created_at: DateTime::from_timestamp(post_data.created_utc as i64, 0),
        }
    }
}

/// Walks a comment forest depth-first. "Load more" stubs are dropped.
pub fn flatten_comments(
    children: Vec<RedditListingChild<Value>>,
    out: &mut Vec<RawComment>,
) -> Result<usize, CoreError> {
    let mut skipped = 0;
    for child in children {
        match child.kind.as_str() {
            "t1" => {
                let comment: RedditCommentData = serde_json::from_value(child.data)?;
                if comment.is_removed() {
                    skipped += 1;
                } else if !comment.body.trim().is_empty() {
                    out.push(RawComment {
                        body: comment.body.clone(),
                    });
                }
                if comment.replies.is_object() {
                    let replies: RedditListing<Value> = serde_json::from_value(comment.replies)?;
                    skipped += flatten_comments(replies.data.children, out)?;
                }
            }
            "more" => skipped += 1,
            other => debug!("Ignoring unexpected listing child kind {}", other),
        }
    }
    Ok(skipped)
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: RateLimiter,
    api_base: Url,
}

impl RedditApiClient {
    pub fn new(
        user_agent: &str,
        api_base: Url,
        rate_config: RateLimitConfig,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(rate_config),
            api_base,
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base.as_str().trim_end_matches('/'), endpoint)
    }

    /// Sends one authenticated request; `not_found` is returned on a 404.
    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
        not_found: RedditApiError,
    ) -> Result<Response, CoreError> {
        let url = self.endpoint_url(endpoint);

        let permit = self.rate_limiter.acquire_permit().await;
        debug!(
            "Acquired rate limit permit for {} {} after {:?}",
            method, endpoint, permit.queue_wait_time
        );

        info!("Making Reddit API request: {} {}", method, endpoint);
        let response = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .query(&[("raw_json", "1")])
            .query(query_params)
            .send()
            .await
            .map_err(|e| {
                error!("Network error for {} {}: {}", method, endpoint, e);
                CoreError::Network(e)
            })?;

        self.observe_rate_headers(response.headers()).await;

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        Err(status_error(status, response.headers(), endpoint, not_found).into())
    }

    async fn observe_rate_headers(&self, headers: &HeaderMap) {
        let header_f64 = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
        };
        let reset = header_f64("x-ratelimit-reset")
            .and_then(|secs| Duration::try_from_secs_f64(secs.max(0.0)).ok());
        if let (Some(remaining), Some(reset)) = (header_f64("x-ratelimit-remaining"), reset) {
            self.rate_limiter
                .record_server_budget(remaining, reset)
                .await;
        }
    }

    pub async fn get_subreddit_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        sort: &str,
        limit: usize,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/{}", subreddit, sort);
        let limit_str = limit.min(MAX_PAGE_SIZE).to_string();
        let mut params = vec![("limit", limit_str.as_str())];
        if let Some(after_val) = after {
            params.push(("after", after_val));
        }

        let response = self
            .make_request(
                Method::GET,
                &endpoint,
                access_token,
                &params,
                RedditApiError::SubredditNotFound {
                    subreddit: subreddit.to_string(),
                },
            )
            .await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// Flattened comment bodies for one post.
    pub async fn get_comments(
        &self,
        access_token: &str,
        post_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RawComment>, CoreError> {
        let endpoint = format!("/comments/{}", post_id);
        let limit_str = limit.map(|l| l.to_string());
        let mut params = Vec::with_capacity(1);
        if let Some(ref limit_s) = limit_str {
            params.push(("limit", limit_s.as_str()));
        }

        let response = self
            .make_request(
                Method::GET,
                &endpoint,
                access_token,
                &params,
                RedditApiError::PostNotFound {
                    post_id: post_id.to_string(),
                },
            )
            .await?;

        // The body is `[post listing, comment listing]`.
        let mut listings: Vec<RedditListing<Value>> = response.json().await.map_err(|e| {
            error!("Failed to parse comments for {}: {}", post_id, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse comments for post {}", post_id),
            })
        })?;
        if listings.len() < 2 {
            return Err(RedditApiError::InvalidResponse {
                details: format!("Comment response for post {} has no comment listing", post_id),
            }
            .into());
        }
        let comment_listing = listings.swap_remove(1);

        let mut comments = Vec::new();
        let skipped = flatten_comments(comment_listing.data.children, &mut comments)?;
        debug!(
            "Post {}: {} comments, {} stubs or removed",
            post_id,
            comments.len(),
            skipped
        );
        Ok(comments)
    }

    pub async fn get_rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limiter.get_rate_limit_status().await
    }
}

fn status_error(
    status: StatusCode,
    headers: &HeaderMap,
    endpoint: &str,
    not_found: RedditApiError,
) -> RedditApiError {
    match status.as_u16() {
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => not_found,
        429 => {
            let retry_after = headers
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", code, endpoint),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_conversion() {
        let post_data = RedditPostData {
            id: "test123".to_string(),
            title: "GME earnings".to_string(),
            selftext: "Thoughts?".to_string(),
            author: "test_user".to_string(),
            subreddit: "wallstreetbets".to_string(),
            permalink: "/r/wallstreetbets/comments/test123".to_string(),
            created_utc: 1640995200.0,
            score: 42,
            num_comments: 5,
            stickied: false,
        };

        let submission: RawSubmission = post_data.into();
        assert_eq!(submission.id, "test123");
        assert_eq!(submission.title, "GME earnings");
        assert_eq!(submission.score, 42);
        assert_eq!(submission.num_comments, 5);
        assert_eq!(
            submission.created_at.map(|t| t.timestamp()),
            Some(1640995200)
        );
    }

    #[test]
    fn test_flatten_nested_comments() {
        let children: Vec<RedditListingChild<Value>> = serde_json::from_value(json!([
            {
                "kind": "t1",
                "data": {
                    "id": "c1",
                    "body": "GME to the moon",
                    "replies": {
                        "kind": "Listing",
                        "data": {
                            "after": null,
                            "before": null,
                            "children": [
                                { "kind": "t1", "data": { "id": "c2", "body": "AMC too", "replies": "" } },
                                { "kind": "t1", "data": { "id": "c3", "body": "[deleted]", "replies": "" } }
                            ]
                        }
                    }
                }
            },
            { "kind": "t1", "data": { "id": "c4", "body": "puts", "replies": "" } },
            { "kind": "more", "data": { "count": 12, "children": ["c5", "c6"] } }
        ]))
        .unwrap();

        let mut comments = Vec::new();
        let skipped = flatten_comments(children, &mut comments).unwrap();

        let bodies: Vec<&str> = comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["GME to the moon", "AMC too", "puts"]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_status_error_mapping() {
        let headers = HeaderMap::new();
        let not_found = || RedditApiError::SubredditNotFound {
            subreddit: "nope".to_string(),
        };

        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, &headers, "/r/x/new", not_found()),
            RedditApiError::InvalidToken
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, &headers, "/r/x/new", not_found()),
            RedditApiError::SubredditNotFound { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, &headers, "/r/x/new", not_found()),
            RedditApiError::ServerError { status_code: 502 }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, &headers, "/r/x/new", not_found()),
            RedditApiError::RateLimitExceeded { retry_after: 60 }
        ));
    }

    #[test]
    fn test_retry_after_header_is_read() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", "17".parse().unwrap());
        let err = status_error(
            StatusCode::TOO_MANY_REQUESTS,
            &headers,
            "/r/x/new",
            RedditApiError::InvalidToken,
        );
        assert!(matches!(
            err,
            RedditApiError::RateLimitExceeded { retry_after: 17 }
        ));
    }
}
