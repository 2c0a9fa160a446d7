//! In-memory fakes of the persistence and storage ports, shared by the
//! scenario and property suites.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use bytes::Bytes;

use corkboard_shared::types::{AttachmentId, PostId};

use super::error::AttachmentError;
use super::service::{AttachmentRepository, AttachmentStore};
use super::types::{Attachment, NewAttachmentRecord, ThumbnailAssociation};
use crate::storage::StorageError;

/// In-memory attachment repository keyed by attachment id.
pub struct MockRepository {
    attachments: Mutex<BTreeMap<i64, Attachment>>,
    thumbnails: Mutex<HashMap<i64, ThumbnailAssociation>>,
    next_id: AtomicI64,
    fail_saves: AtomicBool,
    pub thumbnail_saves: AtomicUsize,
    pub thumbnail_updates: AtomicUsize,
    pub thumbnail_clears: AtomicUsize,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            attachments: Mutex::new(BTreeMap::new()),
            thumbnails: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1000),
            fail_saves: AtomicBool::new(false),
            thumbnail_saves: AtomicUsize::new(0),
            thumbnail_updates: AtomicUsize::new(0),
            thumbnail_clears: AtomicUsize::new(0),
        }
    }

    /// Pre-populate one stored attachment with a fixed id.
    pub fn seed_attachment(&self, post_id: PostId, id: AttachmentId) {
        let attachment = Attachment {
            id,
            post_id,
            original_name: format!("seed-{id}.txt"),
            stored_name: format!("seed-{id}"),
            extension: "txt".to_string(),
            size_bytes: 16,
        };
        self.attachments
            .lock()
            .unwrap()
            .insert(id.into_inner(), attachment);
    }

    /// Pre-populate the post's thumbnail association.
    pub fn seed_thumbnail(&self, post_id: PostId, attachment_id: AttachmentId) {
        let association = ThumbnailAssociation {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            post_id,
            attachment_id,
        };
        self.thumbnails
            .lock()
            .unwrap()
            .insert(post_id.into_inner(), association);
    }

    /// Make every subsequent `save_attachment` fail.
    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    /// Current attachment ids owned by a post.
    pub fn ids_for(&self, post_id: PostId) -> BTreeSet<AttachmentId> {
        self.attachments
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.post_id == post_id)
            .map(|a| a.id)
            .collect()
    }

    /// Current thumbnail association of a post.
    pub fn thumbnail_for(&self, post_id: PostId) -> Option<ThumbnailAssociation> {
        self.thumbnails
            .lock()
            .unwrap()
            .get(&post_id.into_inner())
            .cloned()
    }

    /// Total attachment rows across all posts.
    pub fn row_count(&self) -> usize {
        self.attachments.lock().unwrap().len()
    }
}

impl AttachmentRepository for MockRepository {
    async fn find_all_ids_by_post(
        &self,
        post_id: PostId,
    ) -> Result<BTreeSet<AttachmentId>, AttachmentError> {
        Ok(self.ids_for(post_id))
    }

    async fn find_thumbnail_by_post(
        &self,
        post_id: PostId,
    ) -> Result<Option<ThumbnailAssociation>, AttachmentError> {
        Ok(self.thumbnail_for(post_id))
    }

    async fn save_attachment(
        &self,
        record: NewAttachmentRecord,
    ) -> Result<Attachment, AttachmentError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AttachmentError::repository("simulated save failure"));
        }
        let id = AttachmentId::from_i64(self.next_id.fetch_add(1, Ordering::SeqCst));
        let attachment = Attachment {
            id,
            post_id: record.post_id,
            original_name: record.original_name,
            stored_name: record.stored_name,
            extension: record.extension,
            size_bytes: record.size_bytes,
        };
        self.attachments
            .lock()
            .unwrap()
            .insert(id.into_inner(), attachment.clone());
        Ok(attachment)
    }

    async fn delete_attachment(&self, id: AttachmentId) -> Result<(), AttachmentError> {
        self.attachments.lock().unwrap().remove(&id.into_inner());
        Ok(())
    }

    async fn save_thumbnail(
        &self,
        post_id: PostId,
        attachment_id: AttachmentId,
    ) -> Result<ThumbnailAssociation, AttachmentError> {
        self.thumbnail_saves.fetch_add(1, Ordering::SeqCst);
        let association = ThumbnailAssociation {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            post_id,
            attachment_id,
        };
        self.thumbnails
            .lock()
            .unwrap()
            .insert(post_id.into_inner(), association.clone());
        Ok(association)
    }

    async fn update_thumbnail(
        &self,
        association: &ThumbnailAssociation,
    ) -> Result<(), AttachmentError> {
        self.thumbnail_updates.fetch_add(1, Ordering::SeqCst);
        self.thumbnails
            .lock()
            .unwrap()
            .insert(association.post_id.into_inner(), association.clone());
        Ok(())
    }

    async fn clear_thumbnail(&self, post_id: PostId) -> Result<(), AttachmentError> {
        self.thumbnail_clears.fetch_add(1, Ordering::SeqCst);
        self.thumbnails
            .lock()
            .unwrap()
            .remove(&post_id.into_inner());
        Ok(())
    }
}

/// In-memory object store that can be told to fail after a number of
/// successful writes.
pub struct MockStore {
    objects: Mutex<HashMap<String, Bytes>>,
    writes_before_failure: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            writes_before_failure: AtomicUsize::new(usize::MAX),
        }
    }

    /// Let `n` writes succeed, then fail every write after them.
    pub fn fail_after_writes(&self, n: usize) {
        self.writes_before_failure.store(n, Ordering::SeqCst);
    }

    /// Number of objects currently stored.
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Whether an object exists under this name.
    pub fn contains(&self, stored_name: &str) -> bool {
        self.objects.lock().unwrap().contains_key(stored_name)
    }
}

impl AttachmentStore for MockStore {
    async fn write_bytes(&self, stored_name: &str, data: Bytes) -> Result<(), StorageError> {
        let remaining = self.writes_before_failure.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(StorageError::operation("simulated write failure"));
        }
        if remaining != usize::MAX {
            self.writes_before_failure
                .store(remaining - 1, Ordering::SeqCst);
        }
        self.objects
            .lock()
            .unwrap()
            .insert(stored_name.to_string(), data);
        Ok(())
    }

    async fn delete_bytes(&self, stored_name: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(stored_name);
        Ok(())
    }
}
