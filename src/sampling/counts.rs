//! Time-windowed cache of eligible question counts per category.
//!
//! Counting eligible rows is the most expensive query the sampler needs,
//! and the numbers only have to be roughly right for picking a window
//! offset, so they are recomputed at most once per refresh interval.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::refresh::RefreshPolicy;
use crate::models::Category;
use crate::repository::{QuestionStore, StoreResult};

/// Resolved counts as of `refreshed_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCounts {
    /// Eligible questions per tracked category.
    pub by_category: BTreeMap<Category, u64>,
    /// Every row in the store, eligible or not. `None` for variants that
    /// do not track it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub refreshed_at: DateTime<Utc>,
}

impl CategoryCounts {
    /// Count estimate for a sampling filter. An absent filter uses the
    /// unfiltered total.
    pub fn count_for(&self, category: Option<Category>) -> Option<u64> {
        match category {
            Some(category) => self.by_category.get(&category).copied(),
            None => self.total,
        }
    }
}

struct CacheState {
    counts: CategoryCounts,
    refreshed: Instant,
}

/// Process-wide count cache, owned by whoever builds the sampler.
///
/// Refreshes are not serialized: two callers that both find the cache
/// stale both recompute, and the last write wins. Either result is a
/// valid fresh snapshot. The lock is never held across a store call.
pub struct CountCache {
    tracked: Vec<Category>,
    track_total: bool,
    policy: RefreshPolicy,
    state: RwLock<Option<CacheState>>,
}

impl CountCache {
    pub fn new(tracked: &[Category], track_total: bool, policy: RefreshPolicy) -> Self {
        Self {
            tracked: tracked.to_vec(),
            track_total,
            policy,
            state: RwLock::new(None),
        }
    }

    /// All categories plus the unfiltered total.
    pub fn global() -> Self {
        Self::new(&Category::ALL, true, RefreshPolicy::default())
    }

    /// The three categories shown on the public pages, without a total.
    pub fn pages() -> Self {
        Self::new(&Category::PAGES, false, RefreshPolicy::default())
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.policy = RefreshPolicy::new(interval);
        self
    }

    pub fn tracked(&self) -> &[Category] {
        &self.tracked
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Current counts, recomputed first if the cache is cold or stale.
    ///
    /// Store failures propagate; a stale snapshot is never served instead.
    pub async fn get_counts<S>(&self, store: &S) -> StoreResult<CategoryCounts>
    where
        S: QuestionStore + ?Sized,
    {
        if let Some(counts) = self.fresh() {
            return Ok(counts);
        }

        let grouped = store.count_eligible_by_category().await?;
        let total = if self.track_total {
            Some(store.count_all().await?)
        } else {
            None
        };

        // Categories with no eligible rows are absent from the grouped
        // result; they count as zero rather than staying unset.
        let by_category: BTreeMap<Category, u64> = self
            .tracked
            .iter()
            .map(|category| (*category, grouped.get(category).copied().unwrap_or(0)))
            .collect();

        let counts = CategoryCounts {
            by_category,
            total,
            refreshed_at: Utc::now(),
        };
        debug!(
            "Recomputed question counts: {} categories, total={:?}",
            counts.by_category.len(),
            counts.total
        );

        if let Ok(mut guard) = self.state.write() {
            *guard = Some(CacheState {
                counts: counts.clone(),
                refreshed: Instant::now(),
            });
        }
        Ok(counts)
    }

    /// Last computed counts without touching the store, even if stale.
    pub fn snapshot(&self) -> Option<CategoryCounts> {
        self.state
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|state| state.counts.clone()))
    }

    /// Drop the snapshot so the next read recomputes.
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.state.write() {
            *guard = None;
        }
    }

    fn fresh(&self) -> Option<CategoryCounts> {
        let guard = self.state.read().ok()?;
        let state = guard.as_ref()?;
        if self.policy.is_stale(Some(state.refreshed)) {
            None
        } else {
            Some(state.counts.clone())
        }
    }
}

impl Default for CountCache {
    fn default() -> Self {
        Self::global()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::MemoryStore;

    #[tokio::test]
    async fn test_total_counts_every_row() {
        let store = MemoryStore::new();
        let cache = CountCache::global().with_interval(Duration::ZERO);

        let before = cache.get_counts(&store).await.unwrap();
        store.push(Category::WhatWhereWhen, None, false);
        store.push_condemned(Category::WhatWhereWhen);
        store.push(Category::WhatWhereWhen, None, true);
        let after = cache.get_counts(&store).await.unwrap();

        assert_eq!(after.total.unwrap() - before.total.unwrap(), 3);
        assert_eq!(
            after.by_category[&Category::WhatWhereWhen]
                - before.by_category[&Category::WhatWhereWhen],
            1
        );
    }

    #[tokio::test]
    async fn test_cached_until_interval_elapses() {
        let store = MemoryStore::new();
        store.push(Category::BrainRing, None, true);
        let cache = CountCache::global().with_interval(Duration::from_millis(50));

        let first = cache.get_counts(&store).await.unwrap();
        store.push(Category::BrainRing, None, true);
        let second = cache.get_counts(&store).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.count_queries(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        let third = cache.get_counts(&store).await.unwrap();
        assert_eq!(third.by_category[&Category::BrainRing], 2);
        assert_eq!(store.count_queries(), 2);
    }

    #[tokio::test]
    async fn test_missing_categories_are_zero() {
        let store = MemoryStore::new();
        store.push(Category::OwnGame, None, true);
        let cache = CountCache::global();

        let counts = cache.get_counts(&store).await.unwrap();
        assert_eq!(counts.by_category.len(), Category::ALL.len());
        assert_eq!(counts.by_category[&Category::Erudite], 0);
        assert_eq!(counts.count_for(Some(Category::OwnGame)), Some(1));

        // A zero count does not keep the cache permanently cold
        cache.get_counts(&store).await.unwrap();
        assert_eq!(store.count_queries(), 1);
    }

    #[tokio::test]
    async fn test_pages_variant_skips_total() {
        let store = MemoryStore::new();
        store.push(Category::Internet, None, true);
        let cache = CountCache::pages();

        let counts = cache.get_counts(&store).await.unwrap();
        assert_eq!(counts.total, None);
        assert_eq!(counts.count_for(None), None);
        assert_eq!(counts.count_for(Some(Category::Internet)), None);
        assert_eq!(counts.by_category.len(), 3);
        assert_eq!(store.total_queries(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_masked() {
        let store = MemoryStore::new();
        let cache = CountCache::global().with_interval(Duration::ZERO);
        cache.get_counts(&store).await.unwrap();

        store.set_unavailable(true);
        assert!(cache.get_counts(&store).await.is_err());
        assert!(cache.snapshot().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let store = MemoryStore::new();
        let cache = CountCache::global();
        cache.get_counts(&store).await.unwrap();
        cache.invalidate();
        assert!(cache.snapshot().is_none());
        cache.get_counts(&store).await.unwrap();
        assert_eq!(store.count_queries(), 2);
    }
}
