//! Diesel async connection pool management for SQLite.
//!
//! Uses diesel-async's SyncConnectionWrapper to provide an async interface
//! for SQLite. Since SQLite connections are lightweight, we create new
//! connections per request rather than pooling.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};

use crate::error::StoreError;

/// Diesel error type alias.
pub type DieselError = diesel::result::Error;

/// Async SQLite connection using SyncConnectionWrapper.
pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// A simple async connection factory for SQLite.
///
/// The SyncConnectionWrapper internally uses spawn_blocking for async
/// operation, so a stuck database shows up as a slow future, which
/// [`DbPool::timed`] bounds.
#[derive(Clone, Debug)]
pub struct DbPool {
    database_url: String,
    timeout: Duration,
}

impl DbPool {
    /// Create a new pool.
    pub fn new(database_url: &str) -> Self {
        // Strip sqlite: prefix if present for diesel
        let url = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);
        Self {
            database_url: url.to_string(),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Create pool from a file path.
    pub fn from_path(db_path: &Path) -> Self {
        Self::new(&db_path.display().to_string())
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get a new connection.
    pub async fn get(&self) -> Result<SqliteConn, StoreError> {
        let mut conn = tokio::time::timeout(self.timeout, SqliteConn::establish(&self.database_url))
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // Lock waits on a busy database must not outlive the call timeout.
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}",
            self.timeout.as_millis()
        ))
        .await?;

        Ok(conn)
    }

    /// Run a store future, failing with [`StoreError::Timeout`] if it takes
    /// longer than the configured bound.
    pub async fn timed<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
