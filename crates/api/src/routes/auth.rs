//! Authentication routes for register, login, token refresh, and logout.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::error::error_response;
use corkboard_core::member::{RegistrationDraft, hash_password, verify_password};
use corkboard_db::{MemberRepository, SessionRepository, repositories::member::from_db_role};
use corkboard_shared::AppError;
use corkboard_shared::auth::{
    LoginRequest, LoginResponse, LogoutRequest, MemberInfo, RefreshRequest, RegisterRequest,
    TokenPair,
};
use corkboard_shared::types::MemberId;

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

/// POST /auth/register - Register a new member.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let draft = RegistrationDraft {
        email: payload.email.clone(),
        password: payload.password.clone(),
        nickname: payload.nickname.clone(),
    };
    if let Err(e) = draft.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_registration",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    let member_repo = MemberRepository::new((*state.db).clone());

    match member_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return error_response(&AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return internal_error("An error occurred during registration");
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error("An error occurred during registration");
        }
    };

    // Manager accounts are provisioned out of band; registration always
    // creates a regular member.
    let member = match member_repo
        .create(
            &payload.email,
            &password_hash,
            &payload.nickname,
            corkboard_shared::MemberRole::Member,
        )
        .await
    {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "Failed to create member");
            return internal_error("An error occurred during registration");
        }
    };

    info!(member_id = %member.id, "New member registered");

    (
        StatusCode::CREATED,
        Json(json!({
            "member": {
                "id": member.id,
                "email": member.email,
                "nickname": member.nickname
            }
        })),
    )
        .into_response()
}

/// POST /auth/login - Authenticate a member and return tokens.
#[allow(clippy::too_many_lines)]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let member_repo = MemberRepository::new((*state.db).clone());

    let member = match member_repo.find_by_email(&payload.email).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for unknown email");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    match verify_password(&payload.password, &member.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(member_id = %member.id, "Failed login attempt");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    let member_id = MemberId::from_i64(member.id);
    let role = from_db_role(&member.role);

    let access_token = match state.jwt_service.generate_access_token(member_id, role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during login");
        }
    };
    let refresh_token = match state.jwt_service.generate_refresh_token(member_id, role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error("An error occurred during login");
        }
    };

    // Persist the refresh token as a session row (hashed at rest).
    let session_repo = SessionRepository::new((*state.db).clone());
    let expires_at = Utc::now() + Duration::days(state.jwt_service.refresh_token_expires_days());
    if let Err(e) = session_repo
        .create(member_id, &refresh_token, expires_at, None, None)
        .await
    {
        error!(error = %e, "Failed to create session");
        return internal_error("An error occurred during login");
    }

    info!(member_id = %member.id, "Member logged in");

    let response = LoginResponse {
        member: MemberInfo {
            id: member_id,
            email: member.email,
            nickname: member.nickname,
            role,
        },
        tokens: TokenPair::new(
            access_token,
            refresh_token,
            state.jwt_service.access_token_expires_in(),
        ),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/refresh - Rotate the refresh token and issue a new pair.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            let (error, message) = match e {
                corkboard_shared::jwt::JwtError::Expired => {
                    ("token_expired", "Refresh token has expired")
                }
                _ => ("invalid_token", "Invalid refresh token"),
            };
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response();
        }
    };

    let session_repo = SessionRepository::new((*state.db).clone());

    // The token must still map to a live session row.
    match session_repo.find_by_token(&payload.refresh_token).await {
        Ok(Some(session)) if session.expires_at > Utc::now() => {
            if let Err(e) = session_repo.revoke(session.id).await {
                error!(error = %e, "Failed to revoke rotated session");
                return internal_error("An error occurred during token refresh");
            }
        }
        Ok(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_token",
                    "message": "Refresh token is no longer valid"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error("An error occurred during token refresh");
        }
    }

    let member_id = claims.member_id();
    let access_token = match state.jwt_service.generate_access_token(member_id, claims.role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during token refresh");
        }
    };
    let refresh_token = match state
        .jwt_service
        .generate_refresh_token(member_id, claims.role)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error("An error occurred during token refresh");
        }
    };

    let expires_at = Utc::now() + Duration::days(state.jwt_service.refresh_token_expires_days());
    if let Err(e) = session_repo
        .create(member_id, &refresh_token, expires_at, None, None)
        .await
    {
        error!(error = %e, "Failed to create rotated session");
        return internal_error("An error occurred during token refresh");
    }

    (
        StatusCode::OK,
        Json(TokenPair::new(
            access_token,
            refresh_token,
            state.jwt_service.access_token_expires_in(),
        )),
    )
        .into_response()
}

/// POST /auth/logout - Revoke the session behind a refresh token.
async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());

    match session_repo.revoke_by_token(&payload.refresh_token).await {
        Ok(revoked) => {
            if revoked {
                info!("Session revoked on logout");
            }
            // Logging out an unknown token is not an error.
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error during logout");
            internal_error("An error occurred during logout")
        }
    }
}

fn invalid_credentials() -> axum::response::Response {
    error_response(&AppError::Unauthorized("Invalid email or password".to_string()))
}

fn internal_error(message: &str) -> axum::response::Response {
    error_response(&AppError::Internal(message.to_string()))
}
