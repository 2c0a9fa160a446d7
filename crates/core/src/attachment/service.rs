//! Attachment service implementation.
//!
//! The service is the reconciliation engine behind post create/edit: it
//! ingests newly uploaded files and diffs a post's stored attachment set
//! against a client-requested survivor set, maintaining the post's single
//! thumbnail pointer either way.

use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use corkboard_shared::types::{AttachmentId, PostId};

use super::error::AttachmentError;
use super::policy::{AttachmentKind, AttachmentPolicy, PolicyCatalog, extension_of};
use super::types::{
    AddNewRequest, ApplyOutcome, Attachment, AttachmentUpdate, EditExistingRequest, IngestResult,
    NewAttachmentRecord, NewUpload, ReconcileResult, RejectedUpload, ThumbnailAction,
    ThumbnailAssociation,
};
use crate::storage::StorageError;

/// Repository trait for attachment persistence.
///
/// This trait is implemented by the db crate to provide actual database
/// operations. One service call is expected to run against one logical
/// transaction supplied by the caller; the service performs no locking of
/// its own.
pub trait AttachmentRepository: Send + Sync {
    /// All attachment ids currently owned by a post.
    fn find_all_ids_by_post(
        &self,
        post_id: PostId,
    ) -> impl std::future::Future<Output = Result<BTreeSet<AttachmentId>, AttachmentError>> + Send;

    /// The post's thumbnail association, if any.
    fn find_thumbnail_by_post(
        &self,
        post_id: PostId,
    ) -> impl std::future::Future<Output = Result<Option<ThumbnailAssociation>, AttachmentError>> + Send;

    /// Persist a new attachment row and return it with its assigned id.
    fn save_attachment(
        &self,
        record: NewAttachmentRecord,
    ) -> impl std::future::Future<Output = Result<Attachment, AttachmentError>> + Send;

    /// Delete one attachment row. Deleting an absent row is not an error.
    fn delete_attachment(
        &self,
        id: AttachmentId,
    ) -> impl std::future::Future<Output = Result<(), AttachmentError>> + Send;

    /// Create the post's thumbnail association.
    fn save_thumbnail(
        &self,
        post_id: PostId,
        attachment_id: AttachmentId,
    ) -> impl std::future::Future<Output = Result<ThumbnailAssociation, AttachmentError>> + Send;

    /// Re-point an existing thumbnail association.
    fn update_thumbnail(
        &self,
        association: &ThumbnailAssociation,
    ) -> impl std::future::Future<Output = Result<(), AttachmentError>> + Send;

    /// Remove the post's thumbnail association.
    fn clear_thumbnail(
        &self,
        post_id: PostId,
    ) -> impl std::future::Future<Output = Result<(), AttachmentError>> + Send;
}

/// Storage trait for attachment bytes.
///
/// Implemented by the OpenDAL-backed storage service; the engine only ever
/// writes new objects and deletes objects it wrote.
pub trait AttachmentStore: Send + Sync {
    /// Write an object under a server-generated name.
    fn write_bytes(
        &self,
        stored_name: &str,
        data: bytes::Bytes,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Delete an object. Deleting an absent object is not an error.
    fn delete_bytes(
        &self,
        stored_name: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

/// Per-file outcome inside an ingest batch.
enum StoreOutcome {
    Stored(Attachment),
    Rejected(RejectedUpload),
}

/// Attachment/thumbnail reconciliation service.
pub struct AttachmentService<R: AttachmentRepository, S: AttachmentStore> {
    repo: Arc<R>,
    store: Arc<S>,
    policies: PolicyCatalog,
}

impl<R: AttachmentRepository, S: AttachmentStore> AttachmentService<R, S> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(repo: Arc<R>, store: Arc<S>, policies: PolicyCatalog) -> Self {
        Self {
            repo,
            store,
            policies,
        }
    }

    /// Single entry point: routes one update to the matching arm.
    ///
    /// # Errors
    ///
    /// Propagates the routed arm's error unchanged.
    pub async fn apply(
        &self,
        post_id: PostId,
        kind: AttachmentKind,
        update: AttachmentUpdate,
    ) -> Result<ApplyOutcome, AttachmentError> {
        match update {
            AttachmentUpdate::AddNew(request) => self
                .ingest_new(post_id, kind, request)
                .await
                .map(ApplyOutcome::Added),
            AttachmentUpdate::EditExisting(request) => self
                .reconcile_existing(post_id, request)
                .await
                .map(ApplyOutcome::Edited),
        }
    }

    /// Validate and persist newly uploaded files.
    ///
    /// Attachment entries beyond the policy's count limit are silently
    /// truncated. Each taken file has its bytes written first and is
    /// validated after; a validation failure removes the just-written
    /// bytes and skips that file without aborting the batch. A thumbnail
    /// file is persisted like a regular attachment and then the post's
    /// association is created or re-pointed at it.
    ///
    /// # Errors
    ///
    /// Returns `StorageIo` only for a genuine write failure, never for a
    /// rejected file; on any fatal error the rows and bytes this call
    /// produced are removed again.
    pub async fn ingest_new(
        &self,
        post_id: PostId,
        kind: AttachmentKind,
        request: AddNewRequest,
    ) -> Result<IngestResult, AttachmentError> {
        if request.is_empty() {
            return Ok(IngestResult::default());
        }

        let policy = self.policies.policy(kind);
        let mut result = IngestResult::default();
        let mut written: Vec<String> = Vec::new();

        let AddNewRequest {
            thumbnail,
            attachments,
        } = request;

        for upload in attachments.into_iter().take(policy.max_count()) {
            match self.store_one(post_id, policy, upload, &mut written).await {
                Ok(StoreOutcome::Stored(attachment)) => result.created.push(attachment),
                Ok(StoreOutcome::Rejected(rejected)) => result.rejected.push(rejected),
                Err(fatal) => {
                    self.unwind_ingest(&result.created, &written).await;
                    return Err(fatal);
                }
            }
        }

        if let Some(upload) = thumbnail {
            match self.store_one(post_id, policy, upload, &mut written).await {
                Ok(StoreOutcome::Stored(attachment)) => {
                    let target = attachment.id;
                    result.created.push(attachment);
                    if let Err(fatal) = self.point_thumbnail_at(post_id, target).await {
                        self.unwind_ingest(&result.created, &written).await;
                        return Err(fatal);
                    }
                    result.thumbnail_changed = true;
                }
                Ok(StoreOutcome::Rejected(rejected)) => result.rejected.push(rejected),
                Err(fatal) => {
                    self.unwind_ingest(&result.created, &written).await;
                    return Err(fatal);
                }
            }
        }

        Ok(result)
    }

    /// Reconcile a post's stored attachments against a survivor set.
    ///
    /// A post without attachments makes any request a no-op success. The
    /// thumbnail transition is evaluated against the full pre-deletion
    /// set; deletions are applied afterwards, each independent and
    /// idempotent.
    ///
    /// # Errors
    ///
    /// `CannotUpdateThumbnail` when `SetTo` names an attachment the post
    /// does not own; nothing is mutated in that case.
    pub async fn reconcile_existing(
        &self,
        post_id: PostId,
        request: EditExistingRequest,
    ) -> Result<ReconcileResult, AttachmentError> {
        let all_ids = self.repo.find_all_ids_by_post(post_id).await?;
        if all_ids.is_empty() {
            return Ok(ReconcileResult::default());
        }

        let mut result = ReconcileResult::default();

        match request.thumbnail {
            ThumbnailAction::NoChange => {}
            ThumbnailAction::Clear => {
                if self.repo.find_thumbnail_by_post(post_id).await?.is_some() {
                    self.repo.clear_thumbnail(post_id).await?;
                    result.thumbnail_changed = true;
                }
            }
            ThumbnailAction::SetTo(target) => {
                if !all_ids.contains(&target) {
                    return Err(AttachmentError::cannot_update_thumbnail(post_id, target));
                }
                match self.repo.find_thumbnail_by_post(post_id).await? {
                    // Already pointing there: skip the redundant write.
                    Some(association) if association.attachment_id == target => {}
                    Some(mut association) => {
                        association.attachment_id = target;
                        self.repo.update_thumbnail(&association).await?;
                        result.thumbnail_changed = true;
                    }
                    None => {
                        self.repo.save_thumbnail(post_id, target).await?;
                        result.thumbnail_changed = true;
                    }
                }
            }
        }

        for id in all_ids.difference(&request.survivors).copied() {
            self.repo.delete_attachment(id).await?;
            result.deleted.push(id);
        }

        Ok(result)
    }

    /// Write one upload's bytes, validate it, and persist the row.
    async fn store_one(
        &self,
        post_id: PostId,
        policy: &AttachmentPolicy,
        upload: NewUpload,
        written: &mut Vec<String>,
    ) -> Result<StoreOutcome, AttachmentError> {
        let extension = extension_of(&upload.original_name);
        let stored_name = stored_name_for(&extension);
        let size_bytes = upload.size_bytes();

        // Bytes are transferred before the verdict; a rejected file cleans
        // up after itself.
        self.store
            .write_bytes(&stored_name, upload.data.clone())
            .await?;
        written.push(stored_name.clone());

        if let Err(reason) = policy.validate(&upload.original_name, size_bytes) {
            // Best-effort; an object without a row is unreachable anyway.
            let _ = self.store.delete_bytes(&stored_name).await;
            written.pop();
            return Ok(StoreOutcome::Rejected(RejectedUpload {
                original_name: upload.original_name,
                reason,
            }));
        }

        let record = NewAttachmentRecord {
            post_id,
            original_name: upload.original_name,
            stored_name,
            extension,
            size_bytes: i64::try_from(size_bytes).unwrap_or(i64::MAX),
        };
        let attachment = self.repo.save_attachment(record).await?;
        Ok(StoreOutcome::Stored(attachment))
    }

    /// Create or re-point the post's thumbnail association.
    async fn point_thumbnail_at(
        &self,
        post_id: PostId,
        target: AttachmentId,
    ) -> Result<(), AttachmentError> {
        match self.repo.find_thumbnail_by_post(post_id).await? {
            Some(mut association) => {
                association.attachment_id = target;
                self.repo.update_thumbnail(&association).await
            }
            None => self.repo.save_thumbnail(post_id, target).await.map(|_| ()),
        }
    }

    /// Remove the rows and bytes a failed ingest call produced.
    async fn unwind_ingest(&self, created: &[Attachment], written: &[String]) {
        for attachment in created {
            let _ = self.repo.delete_attachment(attachment.id).await;
        }
        for stored_name in written {
            let _ = self.store.delete_bytes(stored_name).await;
        }
    }
}

/// Server-generated storage name: collision-resistant and decoupled from
/// the client-supplied file name.
fn stored_name_for(extension: &str) -> String {
    let id = Uuid::new_v4().simple();
    let safe: String = extension
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    if safe.is_empty() {
        id.to_string()
    } else {
        format!("{id}.{safe}")
    }
}

#[cfg(test)]
mod stored_name_tests {
    use super::stored_name_for;

    #[test]
    fn test_stored_name_is_unique_and_safe() {
        let a = stored_name_for("pdf");
        let b = stored_name_for("pdf");
        assert_ne!(a, b);
        assert!(a.ends_with(".pdf"));
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '.'));
    }

    #[test]
    fn test_stored_name_without_extension() {
        let name = stored_name_for("");
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_stored_name_strips_unsafe_extension_chars() {
        let name = stored_name_for("p/d\\f");
        assert!(name.ends_with(".pdf"));
    }
}
