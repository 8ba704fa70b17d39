//! In-memory rate limit backend for single-process operation.
//!
//! Fast, lock-based backend. State is not persisted across restarts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{Decision, RateLimitBackend, RateLimitResult};
use super::config::RateLimitConfig;

/// Bucket count above which full buckets are pruned on acquire.
const PRUNE_THRESHOLD: usize = 10_000;

/// Internal state for one client key.
#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn full(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            tokens: config.burst as f64,
            last_refill: now,
        }
    }

    fn refill(&mut self, config: &RateLimitConfig, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let per_token = config.refill_interval().as_secs_f64();
        if per_token > 0.0 {
            self.tokens = (self.tokens + elapsed.as_secs_f64() / per_token).min(config.burst as f64);
        } else {
            self.tokens = config.burst as f64;
        }
        self.last_refill = now;
    }

    fn is_full(&self, config: &RateLimitConfig, now: Instant) -> bool {
        let per_token = config.refill_interval().as_secs_f64();
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        per_token <= 0.0 || self.tokens + elapsed / per_token >= config.burst as f64
    }
}

/// In-memory token bucket backend.
#[derive(Clone)]
pub struct InMemoryRateLimitBackend {
    buckets: Arc<RwLock<HashMap<String, Bucket>>>,
    config: RateLimitConfig,
}

impl InMemoryRateLimitBackend {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Number of tracked keys.
    pub async fn tracked(&self) -> usize {
        self.buckets.read().await.len()
    }

    async fn acquire_at(&self, key: &str, now: Instant) -> Decision {
        let mut buckets = self.buckets.write().await;
        if buckets.len() > PRUNE_THRESHOLD {
            let config = self.config;
            buckets.retain(|_, bucket| !bucket.is_full(&config, now));
        }

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket::full(&self.config, now));
        bucket.refill(&self.config, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Decision::Allowed {
                remaining: bucket.tokens.floor() as u32,
            }
        } else {
            let missing = 1.0 - bucket.tokens;
            let retry_after = self.config.refill_interval().mul_f64(missing);
            Decision::Limited {
                retry_after: retry_after.max(Duration::from_millis(1)),
            }
        }
    }
}

impl Default for InMemoryRateLimitBackend {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[async_trait]
impl RateLimitBackend for InMemoryRateLimitBackend {
    async fn acquire(&self, key: &str) -> RateLimitResult<Decision> {
        Ok(self.acquire_at(key, Instant::now()).await)
    }

    async fn cleanup(&self) -> RateLimitResult<usize> {
        let now = Instant::now();
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        let config = self.config;
        buckets.retain(|_, bucket| !bucket.is_full(&config, now));
        Ok(before - buckets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(requests: u32, period_secs: u64) -> InMemoryRateLimitBackend {
        InMemoryRateLimitBackend::new(RateLimitConfig::new(
            requests,
            Duration::from_secs(period_secs),
        ))
    }

    #[tokio::test]
    async fn test_burst_then_limited() {
        let backend = backend(3, 60);
        let now = Instant::now();

        for expected in [2, 1, 0] {
            assert_eq!(
                backend.acquire_at("10.0.0.1", now).await,
                Decision::Allowed {
                    remaining: expected
                }
            );
        }

        match backend.acquire_at("10.0.0.1", now).await {
            Decision::Limited { retry_after } => {
                assert!(retry_after <= Duration::from_secs(20));
                assert!(retry_after > Duration::from_secs(19));
            }
            other => panic!("expected Limited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let backend = backend(1, 60);
        let now = Instant::now();
        assert!(backend.acquire_at("a", now).await.is_allowed());
        assert!(!backend.acquire_at("a", now).await.is_allowed());
        assert!(backend.acquire_at("b", now).await.is_allowed());
        assert_eq!(backend.tracked().await, 2);
    }

    #[tokio::test]
    async fn test_tokens_refill_over_time() {
        let backend = backend(2, 60);
        let now = Instant::now();
        backend.acquire_at("a", now).await;
        backend.acquire_at("a", now).await;
        assert!(!backend.acquire_at("a", now).await.is_allowed());

        let later = now + Duration::from_secs(30);
        assert!(backend.acquire_at("a", later).await.is_allowed());
        assert!(!backend.acquire_at("a", later).await.is_allowed());
    }

    #[tokio::test]
    async fn test_cleanup_drops_only_full_buckets() {
        let backend = InMemoryRateLimitBackend::new(RateLimitConfig::new(
            2,
            Duration::from_millis(20),
        ));
        backend.acquire("idle").await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        backend.acquire("busy").await.unwrap();
        backend.acquire("busy").await.unwrap();

        assert_eq!(backend.cleanup().await.unwrap(), 1);
        assert_eq!(backend.tracked().await, 1);
    }
}
