//! Database context for managing connections and repository access.
//!
//! The DbContext is the primary entry point for all database operations.
//! It holds the connection pool and provides access to the repositories.

use std::path::Path;
use std::time::Duration;

use diesel_async::SimpleAsyncConnection;

use super::pool::DbPool;
use super::question::QuestionRepository;
use super::util::validate_database_url;
use crate::error::StoreError;

/// Database context that manages the connection pool and provides repository access.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:questions.db")?;
/// let counts = ctx.questions().count_eligible_by_category().await?;
/// ```
#[derive(Clone, Debug)]
pub struct DbContext {
    pool: DbPool,
}

impl DbContext {
    /// Create a context from a database file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: DbPool::from_path(db_path),
        }
    }

    /// Create a context from a database URL (file path or `sqlite:` URL).
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        validate_database_url(url).map_err(StoreError::Connection)?;
        Ok(Self {
            pool: DbPool::new(url),
        })
    }

    /// Override the per-call store timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.pool = self.pool.with_timeout(timeout);
        self
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get a question repository.
    pub fn questions(&self) -> QuestionRepository {
        QuestionRepository::new(self.pool.clone())
    }

    /// Initialize database schema.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(include_str!("schema_sqlite.sql")).await?;
        Ok(())
    }

    /// Open a connection and run a trivial statement.
    pub async fn test_connection(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute("SELECT 1").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("questions.db"));
        ctx.init_schema().await.unwrap();
        ctx.init_schema().await.unwrap();
        ctx.test_connection().await.unwrap();
        assert_eq!(ctx.questions().count_all().await.unwrap(), 0);
    }

    #[test]
    fn test_rejects_postgres_url() {
        assert!(DbContext::from_url("postgres://localhost/questions").is_err());
        assert!(DbContext::from_url("sqlite:questions.db").is_ok());
    }
}
