//! HTTP mapping for the shared application error.
//!
//! Handlers build an [`AppError`] and hand it here; the status code and
//! machine-readable error code come from the error itself so every route
//! reports failures the same way.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use corkboard_shared::AppError;

/// Renders an [`AppError`] as a JSON error response.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// 500 with the generic internal error body.
pub(crate) fn internal_error() -> Response {
    error_response(&AppError::Internal("An error occurred".to_string()))
}

/// 404 for a missing entity, e.g. `not_found("Post")`.
pub(crate) fn not_found(what: &str) -> Response {
    error_response(&AppError::NotFound(what.to_string()))
}

/// 403 with the given reason.
pub(crate) fn forbidden(message: &str) -> Response {
    error_response(&AppError::Forbidden(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_error_response_maps_status_and_code() {
        let response = error_response(&AppError::Conflict("duplicate email".to_string()));
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = not_found("Post");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = forbidden("managers only");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = internal_error();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
