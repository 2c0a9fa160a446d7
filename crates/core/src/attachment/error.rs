//! Attachment error types.

use thiserror::Error;

use corkboard_shared::types::{AttachmentId, PostId};

use crate::storage::StorageError;

/// Attachment operation errors.
///
/// Per-file validation rejections are not in here: they are reported in
/// the ingest result and never fail a call. "Post has no attachments" is
/// a successful no-op, not an error.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Requested thumbnail target is not attached to the post. Call-wide,
    /// all-or-nothing: no deletion or thumbnail change is applied.
    #[error("cannot update thumbnail for post {post_id}: attachment {attachment_id} does not belong to it")]
    CannotUpdateThumbnail {
        /// The post whose thumbnail was being changed.
        post_id: PostId,
        /// The attachment id the client asked for.
        attachment_id: AttachmentId,
    },

    /// Genuine transport/disk/object-store failure while writing bytes.
    /// Call-wide fatal; rows created earlier in the same call are rolled
    /// back and partially written bytes are removed best-effort.
    #[error("storage I/O failure: {0}")]
    StorageIo(#[from] StorageError),

    /// Persistence port failure.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AttachmentError {
    /// Create a thumbnail referential-integrity error.
    #[must_use]
    pub const fn cannot_update_thumbnail(post_id: PostId, attachment_id: AttachmentId) -> Self {
        Self::CannotUpdateThumbnail {
            post_id,
            attachment_id,
        }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}
