//! Per-IP rate limiting middleware.
//!
//! Applies the fixed-window limiter keyed by the client address from the
//! connection. Runs before authentication so unauthenticated floods are
//! bounded too.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::AppState;
use corkboard_core::ratelimit::RateLimitDecision;

/// Rate limiting middleware keyed by client IP.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string());

    match state.rate_limiter.check(&key) {
        RateLimitDecision::Allowed { .. } => next.run(request).await,
        RateLimitDecision::Limited { retry_after_secs } => {
            warn!(client = %key, retry_after_secs, "Request rate limited");
            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after_secs.to_string())],
                Json(json!({
                    "error": "rate_limited",
                    "message": "Too many requests",
                    "retry_after_secs": retry_after_secs
                })),
            )
                .into_response()
        }
    }
}
