//! Attachment types and data structures.

use std::collections::BTreeSet;

use bytes::Bytes;
use serde::Serialize;

use corkboard_shared::types::{AttachmentId, PostId};

use super::policy::ValidationError;

/// A stored file owned by exactly one post.
///
/// Immutable once created; only deletion or thumbnail references to it
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Unique identifier.
    pub id: AttachmentId,
    /// Owning post.
    pub post_id: PostId,
    /// Client-supplied file name, kept for downloads.
    pub original_name: String,
    /// Server-generated storage name, decoupled from `original_name`.
    pub stored_name: String,
    /// Normalized (lowercase) extension.
    pub extension: String,
    /// File size in bytes.
    pub size_bytes: i64,
}

/// Input for persisting a new attachment row; the id is database-assigned.
#[derive(Debug, Clone)]
pub struct NewAttachmentRecord {
    /// Owning post.
    pub post_id: PostId,
    /// Client-supplied file name.
    pub original_name: String,
    /// Server-generated storage name.
    pub stored_name: String,
    /// Normalized (lowercase) extension.
    pub extension: String,
    /// File size in bytes.
    pub size_bytes: i64,
}

/// A post's pointer to the attachment designated as its representative image.
///
/// At most one exists per post, and `attachment_id` must reference an
/// attachment owned by the same post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailAssociation {
    /// Row identifier.
    pub id: i64,
    /// Owning post.
    pub post_id: PostId,
    /// The attachment the thumbnail points at.
    pub attachment_id: AttachmentId,
}

/// One newly uploaded file: the client's name plus the raw bytes.
#[derive(Debug, Clone)]
pub struct NewUpload {
    /// Client-supplied file name.
    pub original_name: String,
    /// File content.
    pub data: Bytes,
}

impl NewUpload {
    /// Creates an upload from a name and its bytes.
    #[must_use]
    pub fn new(original_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            original_name: original_name.into(),
            data: data.into(),
        }
    }

    /// Size of the upload in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Requested thumbnail transition for an edit.
///
/// An explicit 3-state type: callers say what they want instead of
/// overloading an id field with a magic "clear" value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailAction {
    /// Leave the thumbnail pointer alone.
    #[default]
    NoChange,
    /// Remove the association if one exists (idempotent).
    Clear,
    /// Point the thumbnail at this attachment.
    SetTo(AttachmentId),
}

/// Payload for ingesting newly uploaded files.
#[derive(Debug, Clone, Default)]
pub struct AddNewRequest {
    /// Optional new thumbnail file, persisted like a regular attachment.
    pub thumbnail: Option<NewUpload>,
    /// New attachment files; entries beyond the policy's count limit are
    /// silently truncated.
    pub attachments: Vec<NewUpload>,
}

impl AddNewRequest {
    /// True when there is nothing to ingest.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thumbnail.is_none() && self.attachments.is_empty()
    }
}

/// Payload for reconciling a post's existing attachment set.
#[derive(Debug, Clone, Default)]
pub struct EditExistingRequest {
    /// Attachment ids the client wants retained; everything else currently
    /// owned by the post is deleted. Empty means delete all.
    pub survivors: BTreeSet<AttachmentId>,
    /// Requested thumbnail transition.
    pub thumbnail: ThumbnailAction,
}

/// One client-submitted attachment change, dispatched once at the entry
/// point.
#[derive(Debug, Clone)]
pub enum AttachmentUpdate {
    /// Ingest newly uploaded files.
    AddNew(AddNewRequest),
    /// Reconcile the existing set against a survivor list.
    EditExisting(EditExistingRequest),
}

/// An upload that failed validation and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedUpload {
    /// Client-supplied file name of the rejected upload.
    pub original_name: String,
    /// Why it was rejected.
    pub reason: ValidationError,
}

/// Outcome of ingesting new uploads.
#[derive(Debug, Default)]
pub struct IngestResult {
    /// Attachments persisted by this call, thumbnail file included.
    pub created: Vec<Attachment>,
    /// Uploads skipped by validation, with reasons.
    pub rejected: Vec<RejectedUpload>,
    /// Whether the thumbnail association was created or re-pointed.
    pub thumbnail_changed: bool,
}

impl IngestResult {
    /// Number of attachment rows persisted.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.len()
    }
}

/// Outcome of reconciling an existing attachment set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcileResult {
    /// Attachment ids deleted by this call, in ascending order.
    pub deleted: Vec<AttachmentId>,
    /// Whether the thumbnail association was written or removed.
    pub thumbnail_changed: bool,
}

impl ReconcileResult {
    /// True when the call mutated nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && !self.thumbnail_changed
    }
}

/// Outcome of one dispatched attachment update.
#[derive(Debug)]
pub enum ApplyOutcome {
    /// The call took the ingest path.
    Added(IngestResult),
    /// The call took the reconcile path.
    Edited(ReconcileResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_new_request_is_empty() {
        assert!(AddNewRequest::default().is_empty());

        let with_file = AddNewRequest {
            thumbnail: None,
            attachments: vec![NewUpload::new("a.txt", Bytes::from_static(b"x"))],
        };
        assert!(!with_file.is_empty());

        let with_thumb = AddNewRequest {
            thumbnail: Some(NewUpload::new("t.jpg", Bytes::from_static(b"x"))),
            attachments: vec![],
        };
        assert!(!with_thumb.is_empty());
    }

    #[test]
    fn test_thumbnail_action_default_is_no_change() {
        assert_eq!(ThumbnailAction::default(), ThumbnailAction::NoChange);
    }

    #[test]
    fn test_reconcile_result_noop() {
        assert!(ReconcileResult::default().is_noop());
        let changed = ReconcileResult {
            deleted: vec![],
            thumbnail_changed: true,
        };
        assert!(!changed.is_noop());
    }

    #[test]
    fn test_upload_size() {
        let upload = NewUpload::new("a.txt", Bytes::from_static(b"hello"));
        assert_eq!(upload.size_bytes(), 5);
    }
}
