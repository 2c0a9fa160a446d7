//! Attachment download route.
//!
//! Serves stored bytes back under the original client-supplied file name;
//! the stored object name never leaves the server.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::error;

use crate::AppState;
use crate::error::{internal_error, not_found};
use corkboard_core::storage::StorageError;
use corkboard_db::SeaAttachmentRepository;
use corkboard_shared::types::AttachmentId;

/// Creates the attachment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/attachments/{id}/download", get(download))
}

/// Content type for a normalized (lowercase) extension.
fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "txt" => "text/plain; charset=utf-8",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Quotes a file name for a Content-Disposition header.
fn disposition_for(original_name: &str) -> String {
    let sanitized: String = original_name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{sanitized}\"")
}

/// GET /attachments/{id}/download - Stream an attachment's bytes.
async fn download(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let attachment_id = AttachmentId::from_i64(id);

    let Some(storage) = state.storage.clone() else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "uploads_disabled",
                "message": "File storage is not configured on this server"
            })),
        )
            .into_response();
    };

    let repo = SeaAttachmentRepository::new(state.db.as_ref());
    let attachment = match repo.find_by_id(attachment_id).await {
        Ok(Some(a)) => a,
        Ok(None) => return not_found("Attachment"),
        Err(e) => {
            error!(attachment_id = %attachment_id, error = %e, "Failed to load attachment");
            return internal_error();
        }
    };

    match storage.read_bytes(&attachment.stored_name).await {
        Ok(data) => (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    content_type_for(&attachment.extension).to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    disposition_for(&attachment.original_name),
                ),
            ],
            data,
        )
            .into_response(),
        Err(StorageError::NotFound { .. }) => {
            // Row without bytes: the object was lost out of band.
            error!(attachment_id = %attachment_id, "Stored object missing for attachment row");
            not_found("Attachment")
        }
        Err(e) => {
            error!(attachment_id = %attachment_id, error = %e, "Failed to read attachment bytes");
            internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{content_type_for, disposition_for};

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("jpg"), "image/jpeg");
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for("bin"), "application/octet-stream");
        assert_eq!(content_type_for(""), "application/octet-stream");
    }

    #[test]
    fn test_disposition_quotes_and_sanitizes() {
        assert_eq!(
            disposition_for("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
        assert_eq!(
            disposition_for("we\"ird\n.txt"),
            "attachment; filename=\"we_ird_.txt\""
        );
    }
}
