//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{auth::auth_middleware, rate_limit::rate_limit_middleware},
};

pub mod attachments;
pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;
pub mod reactions;

/// Creates the API router with all routes.
///
/// Read-only board routes are public; everything that writes requires a
/// valid bearer token. The whole surface sits behind the rate limiter.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(posts::protected_routes())
        .merge(comments::routes())
        .merge(reactions::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(posts::public_routes())
        .merge(attachments::routes())
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    use corkboard_core::attachment::PolicyCatalog;
    use corkboard_core::ratelimit::FixedWindowLimiter;
    use corkboard_shared::{JwtConfig, JwtService};

    use crate::{AppState, create_router};

    fn test_state(max_requests: u32) -> AppState {
        AppState {
            db: Arc::new(DatabaseConnection::Disconnected),
            jwt_service: Arc::new(JwtService::new(JwtConfig {
                secret: "router-test-secret".to_string(),
                ..JwtConfig::default()
            })),
            storage: None,
            policies: PolicyCatalog::default(),
            rate_limiter: Arc::new(FixedWindowLimiter::new(max_requests, 60)),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = create_router(test_state(100));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_database() {
        let router = create_router(test_state(100));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_database_failure_maps_to_internal_error_body() {
        let router = create_router(test_state(100));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/posts/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal_error");
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let router = create_router(test_state(100));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let router = create_router(test_state(100));

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/posts/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "missing_token");
    }

    #[tokio::test]
    async fn test_rate_limiter_returns_429() {
        let router = create_router(test_state(1));

        let first = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key("Retry-After"));
        let body = second.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "rate_limited");
    }
}
