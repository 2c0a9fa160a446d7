//! Post routes: create, read, list, edit, delete.
//!
//! Create and edit accept multipart form data. Text fields carry the
//! post content, file parts carry new attachments, and the edit form
//! additionally names the attachment ids to keep plus the requested
//! thumbnail transition. Attachment changes run through the
//! reconciliation engine inside one database transaction.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::error::{forbidden, internal_error, not_found};
use crate::{AppState, middleware::AuthMember};
use corkboard_core::attachment::{
    AddNewRequest, AttachmentError, AttachmentRepository as _, AttachmentService, AttachmentStore,
    EditExistingRequest, IngestResult, NewUpload, RejectedUpload, ThumbnailAction,
};
use corkboard_core::storage::StorageError;
use corkboard_core::post::{PostCategory, PostDraft, PostSearchFilter};
use corkboard_db::repositories::post::from_db_category;
use corkboard_db::{CommentRepository, PostRepository, ReactionRepository, SeaAttachmentRepository};
use corkboard_db::entities::{members, posts};
use corkboard_shared::types::{AttachmentId, PageRequest, PageResponse, PostId};

/// Routes readable without authentication.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
}

/// Routes that require a valid bearer token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/{id}", put(edit_post))
        .route("/posts/{id}", delete(delete_post))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the post list.
#[derive(Debug, Deserialize)]
struct ListParams {
    category: Option<PostCategory>,
    keyword: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
}

/// One post in a list response.
#[derive(Debug, Serialize)]
struct PostSummary {
    id: i64,
    category: PostCategory,
    title: String,
    author_nickname: Option<String>,
    view_count: i64,
    created_at: String,
}

/// An attachment in a post response.
#[derive(Debug, Serialize)]
struct AttachmentView {
    id: i64,
    original_name: String,
    extension: String,
    size_bytes: i64,
}

/// A comment inlined in a post detail response.
#[derive(Debug, Serialize)]
struct CommentInPost {
    id: i64,
    author_nickname: Option<String>,
    body: String,
    created_at: String,
}

/// Full post detail response.
#[derive(Debug, Serialize)]
struct PostDetailResponse {
    id: i64,
    category: PostCategory,
    title: String,
    body: String,
    author_nickname: Option<String>,
    view_count: i64,
    created_at: String,
    updated_at: String,
    attachments: Vec<AttachmentView>,
    thumbnail_attachment_id: Option<i64>,
    comments: Vec<CommentInPost>,
    comment_count: u64,
    likes: u64,
    dislikes: u64,
}

/// An upload skipped by validation, reported back to the client.
#[derive(Debug, Serialize)]
struct RejectedUploadView {
    original_name: String,
    reason: String,
}

/// Store used when no object storage is configured.
///
/// Upload-carrying requests are rejected before the engine runs, so this
/// store only ever sees the reconcile path, which touches no bytes.
struct DisabledStore;

impl AttachmentStore for DisabledStore {
    async fn write_bytes(&self, _stored_name: &str, _data: bytes::Bytes) -> Result<(), StorageError> {
        Err(StorageError::configuration(
            "object storage is not configured",
        ))
    }

    async fn delete_bytes(&self, _stored_name: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Parsed multipart form for create and edit.
#[derive(Debug, Default)]
struct PostForm {
    category: Option<String>,
    title: Option<String>,
    body: Option<String>,
    survivor_ids: Option<String>,
    thumbnail_action: Option<String>,
    files: Vec<NewUpload>,
    thumbnail: Option<NewUpload>,
}

// ============================================================================
// Helpers
// ============================================================================

fn bad_request(error: &str, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Reads a multipart request into a [`PostForm`].
async fn read_form(mut multipart: Multipart) -> Result<PostForm, Response> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        bad_request("invalid_multipart", format!("Malformed multipart body: {e}"))
    })? {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match name.as_str() {
            "files" => {
                let original_name = field
                    .file_name()
                    .map_or_else(|| "upload".to_string(), ToString::to_string);
                let data = field.bytes().await.map_err(|e| {
                    bad_request("invalid_multipart", format!("Failed to read file part: {e}"))
                })?;
                form.files.push(NewUpload::new(original_name, data));
            }
            "thumbnail" => {
                let original_name = field
                    .file_name()
                    .map_or_else(|| "thumbnail".to_string(), ToString::to_string);
                let data = field.bytes().await.map_err(|e| {
                    bad_request("invalid_multipart", format!("Failed to read file part: {e}"))
                })?;
                form.thumbnail = Some(NewUpload::new(original_name, data));
            }
            _ => {
                let text = field.text().await.map_err(|e| {
                    bad_request("invalid_multipart", format!("Failed to read field: {e}"))
                })?;
                match name.as_str() {
                    "category" => form.category = Some(text),
                    "title" => form.title = Some(text),
                    "body" => form.body = Some(text),
                    "survivor_ids" => form.survivor_ids = Some(text),
                    "thumbnail_action" => form.thumbnail_action = Some(text),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

/// Parses the comma-separated survivor id list.
fn parse_survivors(raw: Option<&str>) -> Result<BTreeSet<AttachmentId>, Response> {
    let Some(raw) = raw else {
        return Ok(BTreeSet::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<AttachmentId>().map_err(|_| {
                bad_request(
                    "invalid_survivor_ids",
                    format!("'{part}' is not a valid attachment id"),
                )
            })
        })
        .collect()
}

/// Parses the requested thumbnail transition.
///
/// `keep` (or absent) leaves the pointer alone, `clear` removes it, and a
/// numeric value points it at that attachment.
fn parse_thumbnail_action(raw: Option<&str>) -> Result<ThumbnailAction, Response> {
    match raw {
        None | Some("keep") => Ok(ThumbnailAction::NoChange),
        Some("clear") => Ok(ThumbnailAction::Clear),
        Some(value) => value.parse::<AttachmentId>().map(ThumbnailAction::SetTo).map_err(|_| {
            bad_request(
                "invalid_thumbnail_action",
                format!("'{value}' is not 'keep', 'clear', or an attachment id"),
            )
        }),
    }
}

fn rejected_views(rejected: &[RejectedUpload]) -> Vec<RejectedUploadView> {
    rejected
        .iter()
        .map(|r| RejectedUploadView {
            original_name: r.original_name.clone(),
            reason: r.reason.to_string(),
        })
        .collect()
}

fn attachment_error_response(post_id: PostId, err: &AttachmentError) -> Response {
    match err {
        AttachmentError::CannotUpdateThumbnail { attachment_id, .. } => {
            info!(post_id = %post_id, attachment_id = %attachment_id, "Thumbnail target not owned by post");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "cannot_update_thumbnail",
                    "message": format!(
                        "Attachment {attachment_id} does not belong to post {post_id}"
                    )
                })),
            )
                .into_response()
        }
        AttachmentError::StorageIo(e) => {
            error!(post_id = %post_id, error = %e, "Storage failure during attachment update");
            internal_error()
        }
        AttachmentError::Repository(e) => {
            error!(post_id = %post_id, error = %e, "Repository failure during attachment update");
            internal_error()
        }
    }
}

fn summary_from(model: posts::Model, author: Option<members::Model>) -> PostSummary {
    PostSummary {
        id: model.id,
        category: from_db_category(&model.category),
        title: model.title,
        author_nickname: author.map(|a| a.nickname),
        view_count: model.view_count,
        created_at: model.created_at.to_rfc3339(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /posts - List posts with optional category filter and keyword search.
async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let filter = PostSearchFilter {
        category: params.category,
        keyword: params.keyword,
    };
    let page = PageRequest {
        page: params.page.unwrap_or(1),
        per_page: params.per_page.unwrap_or(20),
    }
    .clamped();

    let post_repo = PostRepository::new((*state.db).clone());
    match post_repo.find_page(&filter, &page).await {
        Ok((rows, total)) => {
            let data: Vec<PostSummary> = rows
                .into_iter()
                .map(|(model, author)| summary_from(model, author))
                .collect();
            Json(PageResponse::new(data, page.page, page.per_page, total)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list posts");
            internal_error()
        }
    }
}

/// GET /posts/{id} - Post detail with attachments, thumbnail, and reactions.
async fn get_post(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let post_id = PostId::from_i64(id);
    let post_repo = PostRepository::new((*state.db).clone());

    let (post, author) = match post_repo.find_with_author(post_id).await {
        Ok(Some(found)) => found,
        Ok(None) => return not_found("Post"),
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load post");
            return internal_error();
        }
    };

    if let Err(e) = post_repo.increment_view_count(post_id).await {
        // A failed counter bump does not block the read.
        error!(post_id = %post_id, error = %e, "Failed to increment view count");
    }

    let attachment_repo = SeaAttachmentRepository::new(state.db.as_ref());
    let attachments = match attachment_repo.list_by_post(post_id).await {
        Ok(list) => list,
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load attachments");
            return internal_error();
        }
    };
    let thumbnail = match attachment_repo.find_thumbnail_by_post(post_id).await {
        Ok(t) => t,
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load thumbnail");
            return internal_error();
        }
    };

    // First page of comments rides along; the rest is paged through the
    // comment list endpoint.
    let comment_page = PageRequest {
        page: 1,
        per_page: 20,
    }
    .clamped();
    let (comment_rows, comment_count) = match CommentRepository::new((*state.db).clone())
        .find_page_by_post(post_id, &comment_page)
        .await
    {
        Ok(found) => found,
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load comments");
            return internal_error();
        }
    };

    let counts = match ReactionRepository::new((*state.db).clone())
        .counts(post_id)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load reaction counts");
            return internal_error();
        }
    };

    Json(PostDetailResponse {
        id: post.id,
        category: from_db_category(&post.category),
        title: post.title,
        body: post.body,
        author_nickname: author.map(|a| a.nickname),
        view_count: post.view_count + 1,
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
        attachments: attachments
            .into_iter()
            .map(|a| AttachmentView {
                id: a.id.into_inner(),
                original_name: a.original_name,
                extension: a.extension,
                size_bytes: a.size_bytes,
            })
            .collect(),
        thumbnail_attachment_id: thumbnail.map(|t| t.attachment_id.into_inner()),
        comments: comment_rows
            .into_iter()
            .map(|(comment, comment_author)| CommentInPost {
                id: comment.id,
                author_nickname: comment_author.map(|a| a.nickname),
                body: comment.body,
                created_at: comment.created_at.to_rfc3339(),
            })
            .collect(),
        comment_count,
        likes: counts.likes,
        dislikes: counts.dislikes,
    })
    .into_response()
}

/// POST /posts - Create a post, ingesting any uploaded files.
#[allow(clippy::too_many_lines)]
async fn create_post(
    State(state): State<AppState>,
    auth: AuthMember,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match read_form(multipart).await {
        Ok(f) => f,
        Err(response) => return response,
    };

    let Some(category_raw) = form.category.as_deref() else {
        return bad_request("missing_field", "'category' field is required".to_string());
    };
    let category: PostCategory = match category_raw.parse() {
        Ok(c) => c,
        Err(e) => return bad_request("invalid_category", e.to_string()),
    };

    let draft = PostDraft {
        category,
        title: form.title.unwrap_or_default(),
        body: form.body.unwrap_or_default(),
    };
    if let Err(e) = draft.validate() {
        return bad_request("invalid_post", e.to_string());
    }

    if category.requires_manager() && !auth.is_manager() {
        return forbidden("Only managers may post notices");
    }

    let has_uploads = form.thumbnail.is_some() || !form.files.is_empty();
    let Some(storage) = state.storage.clone() else {
        if has_uploads {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "uploads_disabled",
                    "message": "File uploads are not configured on this server"
                })),
            )
                .into_response();
        }
        return create_post_without_uploads(&state, &draft, auth).await;
    };

    if !has_uploads {
        return create_post_without_uploads(&state, &draft, auth).await;
    }

    let post_repo = PostRepository::new((*state.db).clone());
    let post = match post_repo
        .create(category, &draft.title, &draft.body, auth.member_id())
        .await
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to create post");
            return internal_error();
        }
    };
    let post_id = PostId::from_i64(post.id);

    // Attachment ingest runs inside its own transaction; the engine
    // unwinds its rows and bytes itself on a fatal error.
    let txn = match state.db.begin().await {
        Ok(t) => t,
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to open transaction");
            let _ = post_repo.delete(post_id).await;
            return internal_error();
        }
    };

    let ingest = {
        let service = AttachmentService::new(
            Arc::new(SeaAttachmentRepository::new(&txn)),
            storage,
            state.policies.clone(),
        );
        service
            .ingest_new(
                post_id,
                category.attachment_kind(),
                AddNewRequest {
                    thumbnail: form.thumbnail,
                    attachments: form.files,
                },
            )
            .await
    };

    let result: IngestResult = match ingest {
        Ok(result) => result,
        Err(e) => {
            let response = attachment_error_response(post_id, &e);
            let _ = post_repo.delete(post_id).await;
            return response;
        }
    };
    if let Err(e) = txn.commit().await {
        error!(post_id = %post_id, error = %e, "Failed to commit attachment ingest");
        let _ = post_repo.delete(post_id).await;
        return internal_error();
    }

    info!(
        post_id = %post_id,
        created = result.created_count(),
        rejected = result.rejected.len(),
        "Post created"
    );

    (
        StatusCode::CREATED,
        Json(json!({
            "id": post.id,
            "category": category,
            "attachments_created": result.created_count(),
            "thumbnail_changed": result.thumbnail_changed,
            "rejected_uploads": rejected_views(&result.rejected)
        })),
    )
        .into_response()
}

/// Create path for posts with no file parts.
async fn create_post_without_uploads(
    state: &AppState,
    draft: &PostDraft,
    auth: AuthMember,
) -> Response {
    let post_repo = PostRepository::new((*state.db).clone());
    match post_repo
        .create(draft.category, &draft.title, &draft.body, auth.member_id())
        .await
    {
        Ok(post) => {
            info!(post_id = %post.id, "Post created");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": post.id,
                    "category": draft.category,
                    "attachments_created": 0,
                    "thumbnail_changed": false,
                    "rejected_uploads": []
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create post");
            internal_error()
        }
    }
}

/// PUT /posts/{id} - Edit a post: fields, survivor set, thumbnail, new files.
#[allow(clippy::too_many_lines)]
async fn edit_post(
    State(state): State<AppState>,
    auth: AuthMember,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> impl IntoResponse {
    let post_id = PostId::from_i64(id);
    let form = match read_form(multipart).await {
        Ok(f) => f,
        Err(response) => return response,
    };

    let post_repo = PostRepository::new((*state.db).clone());
    let post = match post_repo.find_by_id(post_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return not_found("Post"),
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load post");
            return internal_error();
        }
    };

    let category = from_db_category(&post.category);
    if post.author_id != auth.member_id().into_inner() {
        return forbidden("Only the author may edit this post");
    }
    if category.requires_manager() && !auth.is_manager() {
        return forbidden("Only managers may edit notices");
    }

    let draft = PostDraft {
        category,
        title: form.title.unwrap_or_else(|| post.title.clone()),
        body: form.body.unwrap_or_else(|| post.body.clone()),
    };
    if let Err(e) = draft.validate() {
        return bad_request("invalid_post", e.to_string());
    }

    let survivors = match parse_survivors(form.survivor_ids.as_deref()) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let thumbnail_action = match parse_thumbnail_action(form.thumbnail_action.as_deref()) {
        Ok(a) => a,
        Err(response) => return response,
    };

    let has_uploads = form.thumbnail.is_some() || !form.files.is_empty();
    if has_uploads && state.storage.is_none() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "uploads_disabled",
                "message": "File uploads are not configured on this server"
            })),
        )
            .into_response();
    }

    // Reconcile then ingest, both against one transaction: either every
    // attachment change lands or none do.
    let txn = match state.db.begin().await {
        Ok(t) => t,
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to open transaction");
            return internal_error();
        }
    };

    let edit_request = EditExistingRequest {
        survivors,
        thumbnail: thumbnail_action,
    };
    let add_request = AddNewRequest {
        thumbnail: form.thumbnail,
        attachments: form.files,
    };
    let kind = category.attachment_kind();

    let edit_outcome = if let Some(storage) = state.storage.clone() {
        let service = AttachmentService::new(
            Arc::new(SeaAttachmentRepository::new(&txn)),
            storage,
            state.policies.clone(),
        );
        match service.reconcile_existing(post_id, edit_request).await {
            Ok(reconcile) => service
                .ingest_new(post_id, kind, add_request)
                .await
                .map(|ingest| (reconcile, ingest)),
            Err(e) => Err(e),
        }
    } else {
        let service = AttachmentService::new(
            Arc::new(SeaAttachmentRepository::new(&txn)),
            Arc::new(DisabledStore),
            state.policies.clone(),
        );
        service
            .reconcile_existing(post_id, edit_request)
            .await
            .map(|reconcile| (reconcile, IngestResult::default()))
    };

    let (reconcile, ingest) = match edit_outcome {
        Ok(both) => both,
        Err(e) => return attachment_error_response(post_id, &e),
    };
    if let Err(e) = txn.commit().await {
        error!(post_id = %post_id, error = %e, "Failed to commit attachment update");
        return internal_error();
    }

    // Field changes land only after the attachment work has committed, so
    // a failed attachment update leaves the post untouched.
    if let Err(e) = post_repo.update(post_id, &draft.title, &draft.body).await {
        error!(post_id = %post_id, error = %e, "Failed to update post");
        return internal_error();
    }

    info!(
        post_id = %post_id,
        deleted = reconcile.deleted.len(),
        created = ingest.created_count(),
        thumbnail_changed = reconcile.thumbnail_changed || ingest.thumbnail_changed,
        "Post edited"
    );

    Json(json!({
        "id": id,
        "attachments_deleted": reconcile.deleted,
        "attachments_created": ingest.created_count(),
        "thumbnail_changed": reconcile.thumbnail_changed || ingest.thumbnail_changed,
        "rejected_uploads": rejected_views(&ingest.rejected)
    }))
    .into_response()
}

/// DELETE /posts/{id} - Delete a post; cascades take the rest.
async fn delete_post(
    State(state): State<AppState>,
    auth: AuthMember,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let post_id = PostId::from_i64(id);
    let post_repo = PostRepository::new((*state.db).clone());

    let post = match post_repo.find_by_id(post_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return not_found("Post"),
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load post");
            return internal_error();
        }
    };

    let category = from_db_category(&post.category);
    let is_author = post.author_id == auth.member_id().into_inner();
    if !is_author && !auth.is_manager() {
        return forbidden("Only the author or a manager may delete this post");
    }
    if category.requires_manager() && !auth.is_manager() {
        return forbidden("Only managers may delete notices");
    }

    match post_repo.delete(post_id).await {
        Ok(true) => {
            info!(post_id = %post_id, "Post deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => not_found("Post"),
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to delete post");
            internal_error()
        }
    }
}
