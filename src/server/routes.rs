//! Router configuration for the web server.

use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::middleware::rate_limit;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Draws and searches hit the store hardest, so only they are throttled
    let throttled = Router::new()
        .route("/api/questions/random", get(handlers::random_questions))
        .route(
            "/api/questions/random-package",
            get(handlers::random_package),
        )
        .route("/api/questions/search", get(handlers::search_questions))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/questions/:id", get(handlers::question_detail))
        // Counts
        .route("/api/counts", get(handlers::counts))
        .route("/api/counts/pages", get(handlers::page_counts))
        .merge(throttled)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
