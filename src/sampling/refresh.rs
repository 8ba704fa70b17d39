//! Time-to-live gate shared by the count cache variants.

use std::time::{Duration, Instant};

/// Default interval between count recomputations (24 hours).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Decides whether a cached value must be recomputed.
///
/// Uses the monotonic clock, so wall-clock adjustments never make a
/// snapshot look fresher or older than it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    interval: Duration,
}

impl RefreshPolicy {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when the cache was never filled or `interval` has elapsed.
    pub fn is_stale(&self, last_refresh: Option<Instant>) -> bool {
        self.is_stale_at(last_refresh, Instant::now())
    }

    pub fn is_stale_at(&self, last_refresh: Option<Instant>, now: Instant) -> bool {
        match last_refresh {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.interval,
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_is_stale() {
        assert!(RefreshPolicy::default().is_stale(None));
    }

    #[test]
    fn test_fresh_within_interval() {
        let policy = RefreshPolicy::new(Duration::from_secs(60));
        let start = Instant::now();
        assert!(!policy.is_stale_at(Some(start), start + Duration::from_secs(59)));
        assert!(policy.is_stale_at(Some(start), start + Duration::from_secs(60)));
        assert!(policy.is_stale_at(Some(start), start + Duration::from_secs(3600)));
    }

    #[test]
    fn test_clock_going_backwards_is_not_stale() {
        let policy = RefreshPolicy::new(Duration::from_secs(60));
        let later = Instant::now() + Duration::from_secs(10);
        assert!(!policy.is_stale_at(Some(later), later - Duration::from_secs(5)));
    }
}
