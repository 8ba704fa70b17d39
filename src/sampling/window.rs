//! Bounded-offset random windows over the eligible question set.
//!
//! `ORDER BY RANDOM()` over the whole table costs a full scan per request.
//! Instead the sampler picks a random offset, fetches one contiguous slice
//! of at most `W` rows in primary key order, and samples inside it. The
//! draw is not exactly uniform over the table; that is accepted in
//! exchange for a bounded query.

use rand::seq::index;
use rand::Rng;
use tracing::debug;

use crate::models::{Category, Question};
use crate::repository::{QuestionStore, StoreResult};

/// Default window size.
pub const DEFAULT_WINDOW_SIZE: u64 = 5000;

/// Start offset for a window of `window` rows over `count` rows.
///
/// Zero when the whole set fits, otherwise uniform in
/// `[0, count - window - 1]`.
pub fn choose_offset<R: Rng + ?Sized>(count: u64, window: u64, rng: &mut R) -> u64 {
    if count <= window {
        return 0;
    }
    let last_start = count - window - 1;
    rng.random_range(0..=last_start)
}

/// Uniform sample of `min(k, window.len())` questions without replacement.
pub fn sample<R: Rng + ?Sized>(window: Vec<Question>, k: usize, rng: &mut R) -> Vec<Question> {
    let amount = k.min(window.len());
    let mut slots: Vec<Option<Question>> = window.into_iter().map(Some).collect();
    index::sample(rng, slots.len(), amount)
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

/// A fetched window and where it started.
#[derive(Debug, Clone)]
pub struct Window {
    pub offset: u64,
    pub questions: Vec<Question>,
}

/// Fetches fixed-size windows at random offsets.
#[derive(Debug, Clone, Copy)]
pub struct WindowSampler {
    window_size: u64,
}

impl WindowSampler {
    pub fn new(window_size: u64) -> Self {
        Self {
            window_size: window_size.max(1),
        }
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    /// Fetch one window given the current count estimate for `category`.
    pub async fn fetch<S>(
        &self,
        store: &S,
        category: Option<Category>,
        count: u64,
    ) -> StoreResult<Window>
    where
        S: QuestionStore + ?Sized,
    {
        let offset = choose_offset(count, self.window_size, &mut rand::rng());
        self.fetch_at(store, category, offset).await
    }

    /// Fetch the window starting at `offset`.
    pub async fn fetch_at<S>(
        &self,
        store: &S,
        category: Option<Category>,
        offset: u64,
    ) -> StoreResult<Window>
    where
        S: QuestionStore + ?Sized,
    {
        let questions = store
            .fetch_window(category, offset, self.window_size)
            .await?;
        debug!(
            "Fetched window of {} questions at offset {} (category: {:?})",
            questions.len(),
            offset,
            category
        );
        Ok(Window { offset, questions })
    }
}

impl Default for WindowSampler {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}
