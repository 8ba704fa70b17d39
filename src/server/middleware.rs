//! Per-client rate limiting for the expensive endpoints.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::rate_limit::Decision;

/// Take a token from the caller's bucket or answer 429.
///
/// Requests are keyed by peer address. A failing backend lets the
/// request through.
pub async fn rate_limit(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let key = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match state.rate_limiter.acquire(&key).await {
        Ok(Decision::Allowed { .. }) => next.run(request).await,
        Ok(Decision::Limited { retry_after }) => {
            tracing::warn!("Throttling {} on {}", key, request.uri().path());
            let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, secs.to_string())],
                axum::Json(serde_json::json!({ "error": "too many requests" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Rate limiter unavailable, letting request through: {}", e);
            next.run(request).await
        }
    }
}
