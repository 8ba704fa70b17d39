//! Pluggable backend trait for rate limiting storage.

use std::time::Duration;

use async_trait::async_trait;

/// Result type for rate limit operations.
pub type RateLimitResult<T> = Result<T, RateLimitError>;

/// Errors from rate limit backend operations.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of asking for one request slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Request may proceed; whole tokens left in the bucket.
    Allowed { remaining: u32 },
    /// Bucket is empty; a token will be available after `retry_after`.
    Limited { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Trait for rate limit storage backends.
///
/// Implementations must be thread-safe and handle concurrent access.
#[async_trait]
pub trait RateLimitBackend: Send + Sync {
    /// Take one token from `key`'s bucket if one is available.
    async fn acquire(&self, key: &str) -> RateLimitResult<Decision>;

    /// Forget buckets that have refilled completely (housekeeping).
    async fn cleanup(&self) -> RateLimitResult<usize>;
}
