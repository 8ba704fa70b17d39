//! Question count handlers.

use axum::{extract::State, response::IntoResponse};

use super::super::AppState;
use super::helpers::ApiError;
use crate::error::CoreError;

/// Eligible counts for every category plus the overall total.
pub async fn counts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let counts = state.sampler.counts().await?;
    Ok(axum::Json(counts))
}

/// Eligible counts for the categories shown on question pages.
pub async fn page_counts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let counts = state
        .page_counts
        .get_counts(state.questions.as_ref())
        .await
        .map_err(CoreError::from)?;
    Ok(axum::Json(counts))
}
