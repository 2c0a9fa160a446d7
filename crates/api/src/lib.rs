//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication and rate-limiting middleware
//! - Response types

pub(crate) mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use corkboard_core::attachment::PolicyCatalog;
use corkboard_core::ratelimit::FixedWindowLimiter;
use corkboard_core::storage::StorageService;
use corkboard_shared::JwtService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Storage service for attachment bytes (absent disables uploads).
    pub storage: Option<Arc<StorageService>>,
    /// Upload acceptance policies per attachment kind.
    pub policies: PolicyCatalog,
    /// Per-IP request rate limiter.
    pub rate_limiter: Arc<FixedWindowLimiter>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
