//! Question draw, lookup and search handlers.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};

use super::super::AppState;
use super::helpers::{
    ApiError, PackageParams, RandomParams, SearchParams, SearchResponse, SearchSource,
};
use crate::error::CoreError;
use crate::sampling::parse_filter;

/// Random eligible questions, optionally of one category.
pub async fn random_questions(
    State(state): State<AppState>,
    Query(params): Query<RandomParams>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_filter(params.category.as_deref())?;
    let quantity = params.quantity.unwrap_or(state.default_quantity);

    let questions = state.sampler.random_questions(category, quantity).await?;
    Ok(axum::Json(questions))
}

/// One random package with all its eligible questions.
pub async fn random_package(
    State(state): State<AppState>,
    Query(params): Query<PackageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_filter(params.category.as_deref())?;
    let draw = state.sampler.random_package(category).await?;
    Ok(axum::Json(draw))
}

/// A single eligible question.
pub async fn question_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let question = state
        .questions
        .get_eligible(id)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| CoreError::NotFound(format!("question {}", id)))?;
    Ok(axum::Json(question))
}

/// Ranked search through the index, or substring search on the store
/// while the index is unreachable.
pub async fn search_questions(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let category = parse_filter(params.category.as_deref())?;
    let quantity = params.quantity.unwrap_or(state.default_quantity);
    let request = state.search.build_request(
        params.q.as_deref().unwrap_or_default(),
        category,
        params.fuzzy,
        quantity,
    )?;

    let response = match state.search.run(&request).await {
        Ok(questions) => SearchResponse {
            source: SearchSource::Index,
            questions,
        },
        Err(CoreError::IndexUnavailable(e)) => {
            tracing::warn!("{}; falling back to store search", e);
            let questions = state
                .questions
                .search_text(&request.text, request.category, request.size)
                .await
                .map_err(CoreError::from)?;
            SearchResponse {
                source: SearchSource::Store,
                questions,
            }
        }
        Err(e) => return Err(e.into()),
    };

    Ok(axum::Json(response))
}
