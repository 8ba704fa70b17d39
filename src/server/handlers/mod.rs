//! HTTP request handlers for the web server.

mod counts;
mod helpers;
mod questions;

// Re-export handlers for use by the router
pub use counts::{counts, page_counts};
pub use questions::{question_detail, random_package, random_questions, search_questions};

use axum::{http::StatusCode, response::IntoResponse};

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}
