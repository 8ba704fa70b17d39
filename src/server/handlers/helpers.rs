//! Helper types shared by the handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::Question;

/// Query params for random draws.
#[derive(Debug, Deserialize)]
pub struct RandomParams {
    pub quantity: Option<u32>,
    pub category: Option<String>,
}

/// Query params for package draws.
#[derive(Debug, Deserialize)]
pub struct PackageParams {
    pub category: Option<String>,
}

/// Query params for search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub quantity: Option<u32>,
    pub category: Option<String>,
    #[serde(default)]
    pub fuzzy: bool,
}

/// Where search results came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Index,
    /// Substring match on the primary store, used while the index is down.
    Store,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub source: SearchSource,
    pub questions: Vec<Question>,
}

/// Core error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            CoreError::StoreUnavailable(_) | CoreError::IndexUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CoreError::EmptyResultSet(_) | CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::InvalidFilter(_) | CoreError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        }
        (
            status,
            axum::Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IndexError, StoreError};
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let status = |e: CoreError| ApiError(e).status();
        assert_eq!(
            status(StoreError::Timeout(Duration::from_secs(1)).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(IndexError::Unavailable("down".to_string()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(CoreError::EmptyResultSet("none".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(CoreError::InvalidFilter("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(CoreError::Forbidden("no".to_string())),
            StatusCode::FORBIDDEN
        );
    }
}
