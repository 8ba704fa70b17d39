//! Error types shared by the sampling and search core.

use std::time::Duration;

/// Errors from the primary question store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from the external search index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Search index unavailable: {0}")]
    Unavailable(String),
    #[error("Search index returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Malformed search index response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for IndexError {
    fn from(e: reqwest::Error) -> Self {
        IndexError::Unavailable(e.to_string())
    }
}

/// Errors surfaced by sampling and search operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Question store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("Nothing to draw from: {0}")]
    EmptyResultSet(String),
    #[error("Unknown question category: {0}")]
    InvalidFilter(String),
    #[error("Invalid request: {0}")]
    InvalidQuery(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not allowed: {0}")]
    Forbidden(String),
    #[error(transparent)]
    IndexUnavailable(#[from] IndexError),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Whether the failure is the caller's fault rather than an outage.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::EmptyResultSet(_)
                | CoreError::InvalidFilter(_)
                | CoreError::InvalidQuery(_)
                | CoreError::NotFound(_)
                | CoreError::Forbidden(_)
        )
    }
}
