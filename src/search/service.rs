//! Search entry point: validate, rank in the index, load from the store.

use std::sync::Arc;

use super::index::SearchIndex;
use super::query::{SearchRequest, MIN_SEARCH_LENGTH};
use super::reconcile::fetch_in_order;
use crate::error::{CoreError, CoreResult};
use crate::models::{Category, Question};
use crate::repository::QuestionStore;
use crate::sampling::MAX_QUANTITY;

/// Full-text and fuzzy search over eligible questions.
#[derive(Clone)]
pub struct SearchService {
    index: Arc<dyn SearchIndex>,
    store: Arc<dyn QuestionStore>,
    max_quantity: u32,
}

impl SearchService {
    pub fn new(index: Arc<dyn SearchIndex>, store: Arc<dyn QuestionStore>) -> Self {
        Self {
            index,
            store,
            max_quantity: MAX_QUANTITY,
        }
    }

    pub fn with_max_quantity(mut self, max_quantity: u32) -> Self {
        self.max_quantity = max_quantity.max(1);
        self
    }

    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.index
    }

    /// Build a request, rejecting short text and out-of-range quantities
    /// before anything leaves the process.
    pub fn build_request(
        &self,
        text: &str,
        category: Option<Category>,
        fuzzy: bool,
        quantity: u32,
    ) -> CoreResult<SearchRequest> {
        let text = text.trim();
        if text.chars().count() < MIN_SEARCH_LENGTH {
            return Err(CoreError::InvalidQuery(format!(
                "search text must be at least {} characters",
                MIN_SEARCH_LENGTH
            )));
        }
        if quantity == 0 || quantity > self.max_quantity {
            return Err(CoreError::InvalidQuery(format!(
                "quantity must be between 1 and {}, got {}",
                self.max_quantity, quantity
            )));
        }
        Ok(SearchRequest {
            text: text.to_string(),
            fuzzy,
            category,
            size: quantity,
        })
    }

    /// Ranked eligible questions matching `text`.
    ///
    /// An unreachable index fails with [`CoreError::IndexUnavailable`];
    /// falling back to store search is the caller's decision.
    pub async fn search(
        &self,
        text: &str,
        category: Option<Category>,
        fuzzy: bool,
        quantity: u32,
    ) -> CoreResult<Vec<Question>> {
        let request = self.build_request(text, category, fuzzy, quantity)?;
        self.run(&request).await
    }

    pub async fn run(&self, request: &SearchRequest) -> CoreResult<Vec<Question>> {
        let hits = self.index.search(request).await?;
        let ids: Vec<i32> = hits.iter().map(|hit| hit.id).collect();
        Ok(fetch_in_order(self.store.as_ref(), &ids).await?)
    }
}
