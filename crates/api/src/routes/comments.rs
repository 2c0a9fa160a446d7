//! Comment routes.
//!
//! Comments are listed through the post detail endpoint and through
//! `GET /posts/{id}/comments`; writes require authentication and updates
//! or deletions are limited to the author or a manager.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::error::{forbidden, internal_error, not_found};
use crate::{AppState, middleware::AuthMember};
use corkboard_core::comment::CommentDraft;
use corkboard_db::{CommentRepository, PostRepository};
use corkboard_db::entities::{comments, members};
use corkboard_shared::types::{CommentId, PageRequest, PageResponse, PostId};

/// Creates the comment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}/comments", get(list_comments))
        .route("/posts/{id}/comments", post(create_comment))
        .route("/comments/{id}", put(update_comment))
        .route("/comments/{id}", delete(delete_comment))
}

/// Request body for creating or updating a comment.
#[derive(Debug, Deserialize)]
struct CommentBody {
    body: String,
}

/// Pagination query for comment lists.
#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<u32>,
    per_page: Option<u32>,
}

/// One comment in a response.
#[derive(Debug, Serialize)]
struct CommentView {
    id: i64,
    post_id: i64,
    author_nickname: Option<String>,
    body: String,
    created_at: String,
    updated_at: String,
}

fn view_from(model: comments::Model, author: Option<members::Model>) -> CommentView {
    CommentView {
        id: model.id,
        post_id: model.post_id,
        author_nickname: author.map(|a| a.nickname),
        body: model.body,
        created_at: model.created_at.to_rfc3339(),
        updated_at: model.updated_at.to_rfc3339(),
    }
}

/// GET /posts/{id}/comments - List a post's comments, oldest first.
async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let post_id = PostId::from_i64(id);
    let page = PageRequest {
        page: params.page.unwrap_or(1),
        per_page: params.per_page.unwrap_or(20),
    }
    .clamped();

    let comment_repo = CommentRepository::new((*state.db).clone());
    match comment_repo.find_page_by_post(post_id, &page).await {
        Ok((rows, total)) => {
            let data: Vec<CommentView> = rows
                .into_iter()
                .map(|(model, author)| view_from(model, author))
                .collect();
            Json(PageResponse::new(data, page.page, page.per_page, total)).into_response()
        }
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to list comments");
            internal_error()
        }
    }
}

/// POST /posts/{id}/comments - Add a comment to a post.
async fn create_comment(
    State(state): State<AppState>,
    auth: AuthMember,
    Path(id): Path<i64>,
    Json(payload): Json<CommentBody>,
) -> impl IntoResponse {
    let post_id = PostId::from_i64(id);

    let draft = CommentDraft {
        body: payload.body.clone(),
    };
    if let Err(e) = draft.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_comment", "message": e.to_string() })),
        )
            .into_response();
    }

    let post_repo = PostRepository::new((*state.db).clone());
    match post_repo.find_by_id(post_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Post"),
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load post");
            return internal_error();
        }
    }

    let comment_repo = CommentRepository::new((*state.db).clone());
    match comment_repo
        .create(post_id, auth.member_id(), &payload.body)
        .await
    {
        Ok(comment) => {
            info!(post_id = %post_id, comment_id = %comment.id, "Comment created");
            (StatusCode::CREATED, Json(view_from(comment, None))).into_response()
        }
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to create comment");
            internal_error()
        }
    }
}

/// PUT /comments/{id} - Update a comment's body.
async fn update_comment(
    State(state): State<AppState>,
    auth: AuthMember,
    Path(id): Path<i64>,
    Json(payload): Json<CommentBody>,
) -> impl IntoResponse {
    let comment_id = CommentId::from_i64(id);

    let draft = CommentDraft {
        body: payload.body.clone(),
    };
    if let Err(e) = draft.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_comment", "message": e.to_string() })),
        )
            .into_response();
    }

    let comment_repo = CommentRepository::new((*state.db).clone());
    let comment = match comment_repo.find_by_id(comment_id).await {
        Ok(Some(c)) => c,
        Ok(None) => return not_found("Comment"),
        Err(e) => {
            error!(comment_id = %comment_id, error = %e, "Failed to load comment");
            return internal_error();
        }
    };

    if comment.author_id != auth.member_id().into_inner() && !auth.is_manager() {
        return forbidden("Only the author or a manager may edit this comment");
    }

    match comment_repo.update(comment_id, &payload.body).await {
        Ok(updated) => Json(view_from(updated, None)).into_response(),
        Err(e) => {
            error!(comment_id = %comment_id, error = %e, "Failed to update comment");
            internal_error()
        }
    }
}

/// DELETE /comments/{id} - Delete a comment.
async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthMember,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let comment_id = CommentId::from_i64(id);

    let comment_repo = CommentRepository::new((*state.db).clone());
    let comment = match comment_repo.find_by_id(comment_id).await {
        Ok(Some(c)) => c,
        Ok(None) => return not_found("Comment"),
        Err(e) => {
            error!(comment_id = %comment_id, error = %e, "Failed to load comment");
            return internal_error();
        }
    };

    if comment.author_id != auth.member_id().into_inner() && !auth.is_manager() {
        return forbidden("Only the author or a manager may delete this comment");
    }

    match comment_repo.delete(comment_id).await {
        Ok(true) => {
            info!(comment_id = %comment_id, "Comment deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => not_found("Comment"),
        Err(e) => {
            error!(comment_id = %comment_id, error = %e, "Failed to delete comment");
            internal_error()
        }
    }
}
