//! Diesel-based question repository for SQLite.
//!
//! Uses diesel-async's SyncConnectionWrapper to provide an async interface
//! while maintaining Diesel's compile-time query checking.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewQuestionRecord, QuestionRecord};
use super::pool::DbPool;
use super::store::{QuestionStore, StoreResult};
use super::util::escape_like;
use crate::error::StoreError;
use crate::models::{Category, NewQuestion, Question, QuestionStatus};
use crate::schema::questions;

#[derive(diesel::QueryableByName)]
struct PackageRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    package: String,
}

const RANDOM_PACKAGE_SQL: &str = "SELECT package FROM questions \
     WHERE is_condemned = 0 AND is_published = 1 AND package IS NOT NULL \
     GROUP BY package ORDER BY RANDOM() LIMIT 1";

const RANDOM_PACKAGE_BY_TYPE_SQL: &str = "SELECT package FROM questions \
     WHERE is_condemned = 0 AND is_published = 1 AND package IS NOT NULL \
     AND question_type = ? \
     GROUP BY package ORDER BY RANDOM() LIMIT 1";

/// Diesel-based question repository with compile-time query checking.
#[derive(Clone, Debug)]
pub struct QuestionRepository {
    pool: DbPool,
}

impl QuestionRepository {
    /// Create a new question repository with an existing pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    // ========================================================================
    // Moderation and submission
    // ========================================================================

    /// Insert a submitted question. It starts unpublished regardless of input.
    pub async fn create(
        &self,
        question: &NewQuestion,
        user_id: Option<i32>,
    ) -> Result<Question, StoreError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(questions::table)
            .values(NewQuestionRecord::from_submission(question, user_id))
            .execute(&mut conn)
            .await?;

        let id: i32 = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>(
            "last_insert_rowid()",
        ))
        .get_result(&mut conn)
        .await?;

        questions::table
            .find(id)
            .first::<QuestionRecord>(&mut conn)
            .await
            .map(Question::from)
            .map_err(StoreError::from)
    }

    /// Get a question by ID, whatever its moderation state.
    pub async fn get(&self, id: i32) -> Result<Option<Question>, StoreError> {
        let mut conn = self.pool.get().await?;

        let record = questions::table
            .find(id)
            .first::<QuestionRecord>(&mut conn)
            .await
            .optional()?;

        Ok(record.map(Question::from))
    }

    /// Get a question by ID only if it is eligible for public release.
    pub async fn get_eligible(&self, id: i32) -> Result<Option<Question>, StoreError> {
        let mut conn = self.pool.get().await?;

        let record = questions::table
            .filter(questions::id.eq(id))
            .filter(questions::is_condemned.eq(false))
            .filter(questions::is_published.eq(true))
            .first::<QuestionRecord>(&mut conn)
            .await
            .optional()?;

        Ok(record.map(Question::from))
    }

    /// Write every field of an existing question back to the table.
    pub async fn save(&self, question: &Question) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;

        diesel::update(questions::table.find(question.id))
            .set((
                questions::package.eq(question.package.as_deref()),
                questions::tour.eq(question.tour.as_deref()),
                questions::number.eq(question.number),
                questions::question_type.eq(question.category.code()),
                questions::question.eq(&question.question),
                questions::answer.eq(&question.answer),
                questions::pass_criteria.eq(question.pass_criteria.as_deref()),
                questions::authors.eq(question.authors.as_deref()),
                questions::sources.eq(question.sources.as_deref()),
                questions::comments.eq(question.comments.as_deref()),
                questions::is_condemned.eq(question.is_condemned),
                questions::is_published.eq(question.is_published),
                questions::user_id.eq(question.user_id),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Update moderation flags. Returns the updated question, or `None` if
    /// it does not exist.
    pub async fn set_status(
        &self,
        id: i32,
        status: QuestionStatus,
    ) -> Result<Option<Question>, StoreError> {
        let Some(mut question) = self.get(id).await? else {
            return Ok(None);
        };
        if let Some(condemned) = status.is_condemned {
            question.is_condemned = condemned;
        }
        if let Some(published) = status.is_published {
            question.is_published = published;
        }
        self.save(&question).await?;
        Ok(Some(question))
    }

    /// Delete a question.
    pub async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::delete(questions::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    /// Count questions waiting for moderation.
    pub async fn count_unpublished(&self) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await?;

        let count: i64 = questions::table
            .filter(questions::is_published.eq(false))
            .select(count_star())
            .get_result(&mut conn)
            .await?;

        Ok(count as u64)
    }

    // ========================================================================
    // Primary-store search and index export
    // ========================================================================

    /// Substring search over eligible question text.
    ///
    /// SQLite's LIKE only folds ASCII case, so Cyrillic matches are
    /// case-sensitive.
    pub async fn search_text(
        &self,
        pattern: &str,
        category: Option<Category>,
        limit: u32,
    ) -> Result<Vec<Question>, StoreError> {
        let mut conn = self.pool.get().await?;
        let like = format!("%{}%", escape_like(pattern));

        let mut query = questions::table
            .filter(questions::is_condemned.eq(false))
            .filter(questions::is_published.eq(true))
            .filter(questions::question.like(like).escape('\\'))
            .into_boxed();
        if let Some(category) = category {
            query = query.filter(questions::question_type.eq(category.code()));
        }

        let records: Vec<QuestionRecord> = query
            .order(questions::id.asc())
            .limit(limit as i64)
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(Question::from).collect())
    }

    /// Highest assigned question ID.
    pub async fn max_id(&self) -> Result<Option<i32>, StoreError> {
        let mut conn = self.pool.get().await?;

        let max: Option<i32> = questions::table
            .select(diesel::dsl::max(questions::id))
            .get_result(&mut conn)
            .await?;

        Ok(max)
    }

    /// Eligible questions with `first <= id <= last`.
    pub async fn eligible_in_id_range(
        &self,
        first: i32,
        last: i32,
    ) -> Result<Vec<Question>, StoreError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<QuestionRecord> = questions::table
            .filter(questions::id.between(first, last))
            .filter(questions::is_condemned.eq(false))
            .filter(questions::is_published.eq(true))
            .order(questions::id.asc())
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(Question::from).collect())
    }

    // ========================================================================
    // Sampling queries
    // ========================================================================

    /// Eligible question count per category.
    pub async fn count_eligible_by_category(&self) -> Result<HashMap<Category, u64>, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<(String, i64)> = questions::table
            .filter(questions::is_condemned.eq(false))
            .filter(questions::is_published.eq(true))
            .group_by(questions::question_type)
            .select((questions::question_type, count_star()))
            .load(&mut conn)
            .await?;

        let mut counts = HashMap::new();
        for (code, count) in rows {
            match Category::from_code(&code) {
                Some(category) => {
                    counts.insert(category, count as u64);
                }
                None => tracing::warn!("Ignoring unknown question type '{}' in counts", code),
            }
        }
        Ok(counts)
    }

    /// Count every question row.
    pub async fn count_all(&self) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await?;

        let count: i64 = questions::table
            .select(count_star())
            .get_result(&mut conn)
            .await?;

        Ok(count as u64)
    }

    /// Fetch a contiguous slice of eligible questions in primary key order.
    pub async fn fetch_window(
        &self,
        category: Option<Category>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Question>, StoreError> {
        let mut conn = self.pool.get().await?;

        let mut query = questions::table
            .filter(questions::is_condemned.eq(false))
            .filter(questions::is_published.eq(true))
            .into_boxed();
        if let Some(category) = category {
            query = query.filter(questions::question_type.eq(category.code()));
        }

        let records: Vec<QuestionRecord> = query
            .order(questions::id.asc())
            .offset(offset as i64)
            .limit(limit as i64)
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(Question::from).collect())
    }

    /// Pick one package name among eligible questions using the database's
    /// own random ordering.
    pub async fn random_package_name(
        &self,
        category: Option<Category>,
    ) -> Result<Option<String>, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<PackageRow> = match category {
            Some(category) => {
                diesel::sql_query(RANDOM_PACKAGE_BY_TYPE_SQL)
                    .bind::<diesel::sql_types::Text, _>(category.code())
                    .load(&mut conn)
                    .await?
            }
            None => diesel::sql_query(RANDOM_PACKAGE_SQL).load(&mut conn).await?,
        };

        Ok(rows.into_iter().next().map(|row| row.package))
    }

    /// All eligible questions of one package.
    pub async fn fetch_package(
        &self,
        category: Option<Category>,
        package: &str,
    ) -> Result<Vec<Question>, StoreError> {
        let mut conn = self.pool.get().await?;

        let mut query = questions::table
            .filter(questions::package.eq(package))
            .filter(questions::is_condemned.eq(false))
            .filter(questions::is_published.eq(true))
            .into_boxed();
        if let Some(category) = category {
            query = query.filter(questions::question_type.eq(category.code()));
        }

        let records: Vec<QuestionRecord> = query
            .order(questions::id.asc())
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(Question::from).collect())
    }

    /// Eligible questions whose IDs are in `ids`.
    pub async fn fetch_eligible_by_ids(&self, ids: &[i32]) -> Result<Vec<Question>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        let records: Vec<QuestionRecord> = questions::table
            .filter(questions::id.eq_any(ids.to_vec()))
            .filter(questions::is_condemned.eq(false))
            .filter(questions::is_published.eq(true))
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(Question::from).collect())
    }
}

#[async_trait]
impl QuestionStore for QuestionRepository {
    async fn count_eligible_by_category(&self) -> StoreResult<HashMap<Category, u64>> {
        self.pool
            .timed(QuestionRepository::count_eligible_by_category(self))
            .await
    }

    async fn count_all(&self) -> StoreResult<u64> {
        self.pool.timed(QuestionRepository::count_all(self)).await
    }

    async fn fetch_window(
        &self,
        category: Option<Category>,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Question>> {
        self.pool
            .timed(QuestionRepository::fetch_window(self, category, offset, limit))
            .await
    }

    async fn random_package_name(
        &self,
        category: Option<Category>,
    ) -> StoreResult<Option<String>> {
        self.pool
            .timed(QuestionRepository::random_package_name(self, category))
            .await
    }

    async fn fetch_package(
        &self,
        category: Option<Category>,
        package: &str,
    ) -> StoreResult<Vec<Question>> {
        self.pool
            .timed(QuestionRepository::fetch_package(self, category, package))
            .await
    }

    async fn fetch_eligible_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<Question>> {
        self.pool
            .timed(QuestionRepository::fetch_eligible_by_ids(self, ids))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{seed, setup_test_repo};

    #[tokio::test]
    async fn test_question_crud() {
        let (repo, _dir) = setup_test_repo().await;

        let submitted = NewQuestion::new(
            Category::WhatWhereWhen,
            "Текст вопроса (не менее 30-ти символов).",
            "Ответ на вопрос",
        )
        .with_package("package_1");

        let created = repo.create(&submitted, Some(1)).await.unwrap();
        assert!(!created.is_published);
        assert!(!created.is_condemned);
        assert_eq!(created.user_id, Some(1));
        assert_eq!(created.package.as_deref(), Some("package_1"));

        // Unpublished questions are invisible to the public lookup
        assert!(repo.get_eligible(created.id).await.unwrap().is_none());
        assert_eq!(repo.count_unpublished().await.unwrap(), 1);

        let published = repo
            .set_status(
                created.id,
                QuestionStatus {
                    is_published: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(published.is_published);
        assert!(repo.get_eligible(created.id).await.unwrap().is_some());

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_status_missing_question() {
        let (repo, _dir) = setup_test_repo().await;
        let result = repo
            .set_status(42, QuestionStatus::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_counts_split_eligible_and_total() {
        let (repo, _dir) = setup_test_repo().await;
        seed(&repo, Category::WhatWhereWhen, Some("p1"), 3, true).await;
        seed(&repo, Category::BrainRing, Some("p1"), 2, true).await;
        seed(&repo, Category::BrainRing, Some("p2"), 4, false).await;

        let counts = repo.count_eligible_by_category().await.unwrap();
        assert_eq!(counts.get(&Category::WhatWhereWhen), Some(&3));
        assert_eq!(counts.get(&Category::BrainRing), Some(&2));
        assert_eq!(counts.get(&Category::OwnGame), None);
        assert_eq!(repo.count_all().await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_fetch_window_is_ordered_and_bounded() {
        let (repo, _dir) = setup_test_repo().await;
        seed(&repo, Category::WhatWhereWhen, None, 10, true).await;
        seed(&repo, Category::OwnGame, None, 5, true).await;

        let window = repo
            .fetch_window(Some(Category::WhatWhereWhen), 2, 5)
            .await
            .unwrap();
        assert_eq!(window.len(), 5);
        assert!(window.windows(2).all(|w| w[0].id < w[1].id));
        assert!(window
            .iter()
            .all(|q| q.category == Category::WhatWhereWhen));

        let tail = repo.fetch_window(None, 12, 100).await.unwrap();
        assert_eq!(tail.len(), 3);
    }

    #[tokio::test]
    async fn test_random_package_name_respects_filter() {
        let (repo, _dir) = setup_test_repo().await;
        seed(&repo, Category::WhatWhereWhen, Some("www"), 3, true).await;
        seed(&repo, Category::OwnGame, Some("jeopardy"), 3, true).await;
        seed(&repo, Category::BrainRing, Some("hidden"), 3, false).await;

        for _ in 0..20 {
            let name = repo
                .random_package_name(Some(Category::OwnGame))
                .await
                .unwrap();
            assert_eq!(name.as_deref(), Some("jeopardy"));
        }
        assert_eq!(
            repo.random_package_name(Some(Category::BrainRing))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_search_text_sees_only_eligible() {
        let (repo, _dir) = setup_test_repo().await;
        seed(&repo, Category::WhatWhereWhen, None, 12, true).await;
        seed(&repo, Category::WhatWhereWhen, None, 3, false).await;

        let found = repo.search_text("вопроса_11", None, 5).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].question.contains("вопроса_11"));

        let hidden = repo.search_text("вопроса_14", None, 5).await.unwrap();
        assert!(hidden.is_empty());

        let filtered = repo
            .search_text("вопроса_11", Some(Category::OwnGame), 5)
            .await
            .unwrap();
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_eligible_by_ids_drops_ineligible() {
        let (repo, _dir) = setup_test_repo().await;
        let visible = seed(&repo, Category::BrainRing, None, 2, true).await;
        let hidden = seed(&repo, Category::BrainRing, None, 1, false).await;

        let ids = vec![visible[0], hidden[0], visible[1], 999];
        let found = repo.fetch_eligible_by_ids(&ids).await.unwrap();
        let mut found_ids: Vec<i32> = found.iter().map(|q| q.id).collect();
        found_ids.sort();
        assert_eq!(found_ids, visible);

        assert!(repo.fetch_eligible_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_index_export_helpers() {
        let (repo, _dir) = setup_test_repo().await;
        assert_eq!(repo.max_id().await.unwrap(), None);

        let ids = seed(&repo, Category::Erudite, None, 6, true).await;
        assert_eq!(repo.max_id().await.unwrap(), ids.last().copied());

        let batch = repo.eligible_in_id_range(ids[1], ids[3]).await.unwrap();
        assert_eq!(batch.len(), 3);
    }
}
