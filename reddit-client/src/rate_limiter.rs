use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub time_window: Duration,
    pub burst_allowance: u32,
}

impl RateLimitConfig {
    pub fn reddit_oauth() -> Self {
        Self {
            max_requests: 100, // Reddit allows 100 requests per minute for OAuth2
            time_window: Duration::from_secs(60),
            burst_allowance: 10,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::reddit_oauth()
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct TokenBucket {
    state: Mutex<BucketState>,
    capacity: f64,
    refill_rate: f64, // tokens per second
}

impl TokenBucket {
    pub fn new(config: &RateLimitConfig) -> Self {
        let capacity = config.burst_allowance.max(1) as f64;
        let refill_rate = config.max_requests as f64 / config.time_window.as_secs_f64();

        Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            refill_rate,
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill);
        state.tokens = (state.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity);
        state.last_refill = now;
    }

    /// Takes `tokens_needed` or reports how long until they are available.
    pub async fn acquire(&self, tokens_needed: f64) -> Result<(), Duration> {
        let mut state = self.state.lock().await;
        self.refill(&mut state);

        if state.tokens >= tokens_needed {
            state.tokens -= tokens_needed;
            Ok(())
        } else {
            let missing = tokens_needed - state.tokens;
            Err(Duration::try_from_secs_f64(missing / self.refill_rate).unwrap_or(Duration::MAX))
        }
    }

    pub async fn get_available_tokens(&self) -> f64 {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        state.tokens
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ServerBudget {
    remaining: u32,
    resets_at: Instant,
}

/// Paces sequential requests to stay inside Reddit's per-minute budget.
#[derive(Debug)]
pub struct RateLimiter {
    token_bucket: TokenBucket,
    config: RateLimitConfig,
    window_tracker: Mutex<WindowTracker>,
    server_budget: Mutex<Option<ServerBudget>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let token_bucket = TokenBucket::new(&config);
        let window_tracker = Mutex::new(WindowTracker::new(config.time_window));

        Self {
            token_bucket,
            config,
            window_tracker,
            server_budget: Mutex::new(None),
        }
    }

    pub async fn acquire_permit(&self) -> RateLimitPermit {
        let start_time = Instant::now();

        // Reddit reports its own budget; once exhausted, wait for the reset.
        let server_wait = {
            let budget = self.server_budget.lock().await;
            match *budget {
                Some(ServerBudget {
                    remaining: 0,
                    resets_at,
                }) => resets_at.checked_duration_since(Instant::now()),
                _ => None,
            }
        };
        if let Some(wait) = server_wait {
            tracing::warn!("Reddit request budget exhausted, waiting {:?}", wait);
            sleep(wait).await;
        }

        loop {
            match self.token_bucket.acquire(1.0).await {
                Ok(()) => break,
                Err(wait_time) => {
                    tracing::debug!("Rate limit reached, waiting {:?}", wait_time);
                    sleep(wait_time).await;
                }
            }
        }

        self.window_tracker.lock().await.record_request();

        RateLimitPermit {
            queue_wait_time: start_time.elapsed(),
        }
    }

    /// Feeds back the `x-ratelimit-remaining` / `x-ratelimit-reset` headers.
    pub async fn record_server_budget(&self, remaining: f64, reset_in: Duration) {
        let Some(resets_at) = Instant::now().checked_add(reset_in) else {
            tracing::debug!("Ignoring out-of-range rate limit reset {:?}", reset_in);
            return;
        };
        let mut budget = self.server_budget.lock().await;
        *budget = Some(ServerBudget {
            remaining: remaining.max(0.0).floor() as u32,
            resets_at,
        });
    }

    pub async fn get_rate_limit_status(&self) -> RateLimitStatus {
        let available_tokens = self.token_bucket.get_available_tokens().await;
        let window_stats = self.window_tracker.lock().await.get_current_window_stats();
        let server_remaining = self.server_budget.lock().await.as_ref().map(|b| b.remaining);

        RateLimitStatus {
            available_tokens: available_tokens as u32,
            max_tokens: self.config.burst_allowance.max(1),
            requests_per_window: self.config.max_requests,
            current_window_requests: window_stats.request_count,
            server_remaining,
        }
    }
}

#[derive(Debug)]
pub struct RateLimitPermit {
    pub queue_wait_time: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub available_tokens: u32,
    pub max_tokens: u32,
    pub requests_per_window: u32,
    pub current_window_requests: u32,
    pub server_remaining: Option<u32>,
}

impl RateLimitStatus {
    pub fn requests_remaining_in_window(&self) -> u32 {
        self.requests_per_window
            .saturating_sub(self.current_window_requests)
    }
}

#[derive(Debug)]
pub struct WindowTracker {
    window_duration: Duration,
    current_window: WindowStats,
}

#[derive(Debug, Clone)]
pub struct WindowStats {
    pub window_start: Instant,
    pub request_count: u32,
}

impl WindowTracker {
    pub fn new(window_duration: Duration) -> Self {
        Self {
            window_duration,
            current_window: WindowStats {
                window_start: Instant::now(),
                request_count: 0,
            },
        }
    }

    pub fn record_request(&mut self) {
        self.ensure_current_window();
        self.current_window.request_count += 1;
    }

    pub fn get_current_window_stats(&self) -> WindowStats {
        self.current_window.clone()
    }

    fn ensure_current_window(&mut self) {
        if self.current_window.window_start.elapsed() >= self.window_duration {
            self.current_window = WindowStats {
                window_start: Instant::now(),
                request_count: 0,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn test_token_bucket_basic() {
        let config = RateLimitConfig {
            max_requests: 10,
            time_window: Duration::from_secs(10),
            burst_allowance: 5,
        };

        let bucket = TokenBucket::new(&config);

        // Should be able to acquire up to burst allowance
        for _ in 0..5 {
            assert!(bucket.acquire(1.0).await.is_ok());
        }

        // Next acquisition should fail
        assert!(bucket.acquire(1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_token_bucket_refill() {
        let config = RateLimitConfig {
            max_requests: 60, // 1 token per second
            time_window: Duration::from_secs(60),
            burst_allowance: 2,
        };

        let bucket = TokenBucket::new(&config);

        assert!(bucket.acquire(2.0).await.is_ok());
        let wait = bucket.acquire(1.0).await.unwrap_err();
        assert!(wait <= Duration::from_secs(1));

        sleep(Duration::from_millis(1100)).await;

        assert!(bucket.acquire(1.0).await.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limiter_counts_window_requests() {
        let limiter = RateLimiter::new(RateLimitConfig::reddit_oauth());

        let _permit1 = limiter.acquire_permit().await;
        let _permit2 = limiter.acquire_permit().await;

        let status = limiter.get_rate_limit_status().await;
        assert_eq!(status.current_window_requests, 2);
        assert_eq!(status.requests_remaining_in_window(), 98);
        assert!(status.available_tokens <= status.max_tokens);
        assert_eq!(status.server_remaining, None);
    }

    #[tokio::test]
    async fn test_zero_rate_bucket_reports_wait_without_panicking() {
        let config = RateLimitConfig {
            max_requests: 0,
            time_window: Duration::from_secs(60),
            burst_allowance: 1,
        };
        let bucket = TokenBucket::new(&config);

        assert!(bucket.acquire(1.0).await.is_ok());
        assert_eq!(bucket.acquire(1.0).await.unwrap_err(), Duration::MAX);
    }

    #[tokio::test]
    async fn test_unrepresentable_reset_is_ignored() {
        let limiter = RateLimiter::new(RateLimitConfig::reddit_oauth());
        limiter.record_server_budget(0.0, Duration::MAX).await;

        let status = limiter.get_rate_limit_status().await;
        assert_eq!(status.server_remaining, None);
    }

    #[tokio::test]
    async fn test_server_budget_is_reported() {
        let limiter = RateLimiter::new(RateLimitConfig::reddit_oauth());
        limiter
            .record_server_budget(42.0, Duration::from_secs(30))
            .await;

        let status = limiter.get_rate_limit_status().await;
        assert_eq!(status.server_remaining, Some(42));
    }

    #[tokio::test]
    async fn test_exhausted_server_budget_waits_for_reset() {
        let limiter = RateLimiter::new(RateLimitConfig::reddit_oauth());
        limiter
            .record_server_budget(0.0, Duration::from_millis(200))
            .await;

        let permit = limiter.acquire_permit().await;
        assert!(permit.queue_wait_time >= Duration::from_millis(150));
    }

    #[test]
    fn test_window_tracker() {
        let mut tracker = WindowTracker::new(Duration::from_secs(60));
        assert_eq!(tracker.get_current_window_stats().request_count, 0);

        tracker.record_request();
        tracker.record_request();
        assert_eq!(tracker.get_current_window_stats().request_count, 2);
    }
}
