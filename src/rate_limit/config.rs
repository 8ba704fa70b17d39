//! Rate limiter configuration.

use std::time::Duration;

/// Token bucket parameters shared by every client key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Requests allowed per `period`.
    pub requests: u32,
    pub period: Duration,
    /// Bucket capacity; a fresh client may send this many at once.
    pub burst: u32,
}

impl RateLimitConfig {
    pub fn new(requests: u32, period: Duration) -> Self {
        Self {
            requests: requests.max(1),
            period,
            burst: requests.max(1),
        }
    }

    /// Time for one token to drip back into the bucket.
    pub fn refill_interval(&self) -> Duration {
        self.period / self.requests.max(1)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(60))
    }
}
