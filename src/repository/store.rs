//! Read-only store interface consumed by the sampling and search core.
//!
//! The core never talks to Diesel directly; it only needs these queries.
//! [`super::QuestionRepository`] is the production implementation.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Category, Question};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Queries over the question table. Every query except [`count_all`]
/// sees eligible questions only (not condemned, published).
///
/// [`count_all`]: QuestionStore::count_all
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Eligible question count per category. Categories with no eligible
    /// questions are absent from the map.
    async fn count_eligible_by_category(&self) -> StoreResult<HashMap<Category, u64>>;

    /// Count of every row in the table, eligible or not.
    async fn count_all(&self) -> StoreResult<u64>;

    /// Up to `limit` eligible questions starting at `offset`, in primary key order.
    async fn fetch_window(
        &self,
        category: Option<Category>,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Question>>;

    /// One distinct package name picked uniformly at random, or `None`
    /// if no eligible question has a package.
    async fn random_package_name(&self, category: Option<Category>)
        -> StoreResult<Option<String>>;

    /// All eligible questions of a package.
    async fn fetch_package(
        &self,
        category: Option<Category>,
        package: &str,
    ) -> StoreResult<Vec<Question>>;

    /// Eligible questions among `ids`, in no particular order.
    async fn fetch_eligible_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<Question>>;
}
