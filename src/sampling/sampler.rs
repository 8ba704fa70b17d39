//! Sampling entry point used by the HTTP layer and the CLI.

use std::sync::Arc;

use tracing::debug;

use super::counts::{CategoryCounts, CountCache};
use super::package::{select_package, PackageDraw};
use super::window::{sample, WindowSampler};
use crate::error::{CoreError, CoreResult};
use crate::models::{Category, Question};
use crate::repository::QuestionStore;

/// Upper bound on the number of questions per random draw.
pub const MAX_QUANTITY: u32 = 100;

/// Quantity used when the caller does not ask for one.
pub const DEFAULT_QUANTITY: u32 = 10;

/// Random question draws over a store, with a shared count cache.
#[derive(Clone)]
pub struct QuestionSampler {
    store: Arc<dyn QuestionStore>,
    counts: Arc<CountCache>,
    window: WindowSampler,
    max_quantity: u32,
}

impl QuestionSampler {
    pub fn new(store: Arc<dyn QuestionStore>, counts: Arc<CountCache>) -> Self {
        Self {
            store,
            counts,
            window: WindowSampler::default(),
            max_quantity: MAX_QUANTITY,
        }
    }

    pub fn with_window_size(mut self, window_size: u64) -> Self {
        self.window = WindowSampler::new(window_size);
        self
    }

    pub fn with_max_quantity(mut self, max_quantity: u32) -> Self {
        self.max_quantity = max_quantity.max(1);
        self
    }

    pub fn max_quantity(&self) -> u32 {
        self.max_quantity
    }

    pub fn count_cache(&self) -> &CountCache {
        &self.counts
    }

    pub fn store(&self) -> &Arc<dyn QuestionStore> {
        &self.store
    }

    /// Check a requested quantity against `1..=max_quantity`.
    pub fn validate_quantity(&self, quantity: u32) -> CoreResult<usize> {
        if quantity == 0 || quantity > self.max_quantity {
            return Err(CoreError::InvalidQuery(format!(
                "quantity must be between 1 and {}, got {}",
                self.max_quantity, quantity
            )));
        }
        Ok(quantity as usize)
    }

    /// Current counts, refreshing them if stale.
    pub async fn counts(&self) -> CoreResult<CategoryCounts> {
        Ok(self.counts.get_counts(self.store.as_ref()).await?)
    }

    /// Draw up to `quantity` distinct eligible questions.
    ///
    /// Counts come from the cache, a window is fetched at a random offset,
    /// and the result is sampled from that window.
    pub async fn random_questions(
        &self,
        category: Option<Category>,
        quantity: u32,
    ) -> CoreResult<Vec<Question>> {
        let k = self.validate_quantity(quantity)?;

        let counts = self.counts().await?;
        let count = counts.count_for(category).ok_or_else(|| {
            CoreError::InvalidFilter(match category {
                Some(category) => format!("'{}' is not tracked by this sampler", category),
                None => "unfiltered draws are not tracked by this sampler".to_string(),
            })
        })?;

        let mut window = self.window.fetch(self.store.as_ref(), category, count).await?;

        // The estimate can overshoot the eligible set (the unfiltered total
        // includes unpublished rows, and counts may be up to a day old), so
        // an offset past the end is retried once from the start.
        if window.questions.is_empty() && window.offset > 0 {
            debug!(
                "Window at offset {} came back empty, retrying from 0",
                window.offset
            );
            window = self.window.fetch_at(self.store.as_ref(), category, 0).await?;
        }

        if window.questions.is_empty() {
            return Err(CoreError::EmptyResultSet(match category {
                Some(category) => format!("no questions of type '{}'", category),
                None => "no questions available".to_string(),
            }));
        }

        Ok(sample(window.questions, k, &mut rand::rng()))
    }

    /// Draw one random package with all of its eligible questions.
    pub async fn random_package(&self, category: Option<Category>) -> CoreResult<PackageDraw> {
        select_package(self.store.as_ref(), category).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::MemoryStore;
    use std::collections::HashSet;

    fn sampler(store: Arc<MemoryStore>) -> QuestionSampler {
        QuestionSampler::new(store, Arc::new(CountCache::global()))
    }

    #[tokio::test]
    async fn test_random_questions_filtered() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..30 {
            let category = if i % 2 == 0 {
                Category::WhatWhereWhen
            } else {
                Category::OwnGame
            };
            store.push(category, None, true);
        }
        let sampler = sampler(store);

        let drawn = sampler
            .random_questions(Some(Category::WhatWhereWhen), 5)
            .await
            .unwrap();
        assert_eq!(drawn.len(), 5);
        assert!(drawn.iter().all(|q| q.category == Category::WhatWhereWhen));
        let ids: HashSet<i32> = drawn.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_quantity_capped_by_available() {
        let store = Arc::new(MemoryStore::new());
        for _ in 0..3 {
            store.push(Category::Internet, None, true);
        }
        let drawn = sampler(store).random_questions(None, 50).await.unwrap();
        assert_eq!(drawn.len(), 3);
    }

    #[tokio::test]
    async fn test_quantity_bounds() {
        let store = Arc::new(MemoryStore::new());
        store.push(Category::Internet, None, true);
        let sampler = sampler(store);

        for quantity in [0, MAX_QUANTITY + 1] {
            let err = sampler.random_questions(None, quantity).await.unwrap_err();
            assert!(matches!(err, CoreError::InvalidQuery(_)));
        }
        assert!(sampler.random_questions(None, MAX_QUANTITY).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_category_is_empty_result() {
        let store = Arc::new(MemoryStore::new());
        store.push(Category::Internet, None, true);
        let err = sampler(store)
            .random_questions(Some(Category::Beskrylka), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyResultSet(_)));
    }

    #[tokio::test]
    async fn test_overestimated_total_still_draws() {
        let store = Arc::new(MemoryStore::new());
        for _ in 0..5 {
            store.push(Category::BrainRing, None, true);
        }
        // Unpublished rows inflate the unfiltered total far past the window
        for _ in 0..60 {
            store.push(Category::BrainRing, None, false);
        }
        let sampler = sampler(store).with_window_size(10);

        for _ in 0..20 {
            let drawn = sampler.random_questions(None, 1).await.unwrap();
            assert_eq!(drawn.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_untracked_category_is_invalid_filter() {
        let store = Arc::new(MemoryStore::new());
        store.push(Category::Internet, None, true);
        let sampler = QuestionSampler::new(store, Arc::new(CountCache::pages()));

        let err = sampler
            .random_questions(Some(Category::Internet), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidFilter(_)));
    }

    #[tokio::test]
    async fn test_store_outage_propagates() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let err = sampler(store).random_questions(None, 1).await.unwrap_err();
        assert!(matches!(err, CoreError::StoreUnavailable(_)));
    }
}
