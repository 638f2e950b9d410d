// Rate limiting for knowledge graph lookups
//
// One token bucket shared by every lookup worker, so the pool as a whole
// never goes faster than the configured requests per second.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

// Longest single sleep; the bucket is re-checked afterwards
const MAX_WAIT: Duration = Duration::from_secs(60);

/// Token bucket rate limiter
///
/// Tokens refill at a fixed rate up to `max_tokens`. Each request takes one.
pub struct TokenBucketLimiter {
    /// Tokens per second (refill rate)
    tokens_per_second: f64,
    /// Burst capacity
    max_tokens: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucketLimiter {
    /// Create a full bucket
    ///
    /// # Arguments
    /// * `tokens_per_second` - Refill rate (e.g., 10 for 10 requests/sec)
    /// * `max_tokens` - Burst capacity
    pub fn new(tokens_per_second: f64, max_tokens: f64) -> Self {
        Self {
            tokens_per_second,
            max_tokens,
            tokens: max_tokens,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.tokens_per_second).min(self.max_tokens);
        self.last_refill = now;
    }

    /// Take one token if there is one
    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// How long until the next token is available
    pub fn time_until_available(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            let secs = (1.0 - self.tokens) / self.tokens_per_second;
            Duration::try_from_secs_f64(secs)
                .map(|wait| wait.min(MAX_WAIT))
                .unwrap_or(MAX_WAIT)
        }
    }
}

/// A token bucket several tasks can wait on
pub struct SharedRateLimiter {
    bucket: Mutex<TokenBucketLimiter>,
}

impl SharedRateLimiter {
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        Self {
            bucket: Mutex::new(TokenBucketLimiter::new(requests_per_second, f64::from(burst))),
        }
    }

    /// Wait until a request may go out
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                if bucket.try_acquire() {
                    return;
                }
                bucket.time_until_available()
            };

            // never spin on a zero wait
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_starts_full_and_drains() {
        let mut limiter = TokenBucketLimiter::new(1.0, 3.0);

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        assert!(limiter.time_until_available() > Duration::ZERO);
    }

    #[test]
    fn test_refill_is_capped() {
        let mut limiter = TokenBucketLimiter::new(10.0, 2.0);
        std::thread::sleep(Duration::from_millis(300));

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_tiny_rate_waits_are_capped() {
        let mut limiter = TokenBucketLimiter::new(1e-300, 1.0);
        assert!(limiter.try_acquire());

        assert_eq!(limiter.time_until_available(), MAX_WAIT);
    }

    #[tokio::test]
    async fn test_shared_limiter_paces_requests() {
        let limiter = SharedRateLimiter::new(100.0, 1);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }

        // first is free, the next two wait ~10ms each
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
