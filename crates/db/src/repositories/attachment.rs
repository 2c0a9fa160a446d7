//! Attachment repository adapter for the reconciliation engine.
//!
//! Unlike the other repositories this one borrows any `ConnectionTrait`
//! instead of owning a `DatabaseConnection`, so one engine call can run
//! against one caller-supplied transaction.

use std::collections::BTreeSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use corkboard_core::attachment::{
    Attachment, AttachmentError, AttachmentRepository, NewAttachmentRecord, ThumbnailAssociation,
};
use corkboard_shared::types::{AttachmentId, PostId};

use crate::entities::{attachments, post_thumbnails};

/// `SeaORM`-backed implementation of the engine's repository port.
#[derive(Debug, Clone, Copy)]
pub struct SeaAttachmentRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SeaAttachmentRepository<'a, C> {
    /// Creates an adapter over a connection or open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Finds one attachment by ID, as a domain value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: AttachmentId,
    ) -> Result<Option<Attachment>, AttachmentError> {
        let model = attachments::Entity::find_by_id(id.into_inner())
            .one(self.conn)
            .await
            .map_err(to_repo_error)?;

        Ok(model.map(to_domain))
    }

    /// Lists a post's attachments in insertion order, as domain values.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_post(&self, post_id: PostId) -> Result<Vec<Attachment>, AttachmentError> {
        let models = attachments::Entity::find()
            .filter(attachments::Column::PostId.eq(post_id.into_inner()))
            .order_by_asc(attachments::Column::Id)
            .all(self.conn)
            .await
            .map_err(to_repo_error)?;

        Ok(models.into_iter().map(to_domain).collect())
    }
}

impl<C: ConnectionTrait> AttachmentRepository for SeaAttachmentRepository<'_, C> {
    async fn find_all_ids_by_post(
        &self,
        post_id: PostId,
    ) -> Result<BTreeSet<AttachmentId>, AttachmentError> {
        let ids: Vec<i64> = attachments::Entity::find()
            .filter(attachments::Column::PostId.eq(post_id.into_inner()))
            .select_only()
            .column(attachments::Column::Id)
            .into_tuple()
            .all(self.conn)
            .await
            .map_err(to_repo_error)?;

        Ok(ids.into_iter().map(AttachmentId::from_i64).collect())
    }

    async fn find_thumbnail_by_post(
        &self,
        post_id: PostId,
    ) -> Result<Option<ThumbnailAssociation>, AttachmentError> {
        let model = post_thumbnails::Entity::find()
            .filter(post_thumbnails::Column::PostId.eq(post_id.into_inner()))
            .one(self.conn)
            .await
            .map_err(to_repo_error)?;

        Ok(model.map(|m| ThumbnailAssociation {
            id: m.id,
            post_id: PostId::from_i64(m.post_id),
            attachment_id: AttachmentId::from_i64(m.attachment_id),
        }))
    }

    async fn save_attachment(
        &self,
        record: NewAttachmentRecord,
    ) -> Result<Attachment, AttachmentError> {
        let active_model = attachments::ActiveModel {
            post_id: Set(record.post_id.into_inner()),
            original_name: Set(record.original_name),
            stored_name: Set(record.stored_name),
            extension: Set(record.extension),
            size_bytes: Set(record.size_bytes),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let model = active_model
            .insert(self.conn)
            .await
            .map_err(to_repo_error)?;

        Ok(to_domain(model))
    }

    async fn delete_attachment(&self, id: AttachmentId) -> Result<(), AttachmentError> {
        attachments::Entity::delete_by_id(id.into_inner())
            .exec(self.conn)
            .await
            .map_err(to_repo_error)?;

        Ok(())
    }

    async fn save_thumbnail(
        &self,
        post_id: PostId,
        attachment_id: AttachmentId,
    ) -> Result<ThumbnailAssociation, AttachmentError> {
        let now = chrono::Utc::now().into();
        let model = post_thumbnails::ActiveModel {
            post_id: Set(post_id.into_inner()),
            attachment_id: Set(attachment_id.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .map_err(to_repo_error)?;

        Ok(ThumbnailAssociation {
            id: model.id,
            post_id: PostId::from_i64(model.post_id),
            attachment_id: AttachmentId::from_i64(model.attachment_id),
        })
    }

    async fn update_thumbnail(
        &self,
        association: &ThumbnailAssociation,
    ) -> Result<(), AttachmentError> {
        post_thumbnails::ActiveModel {
            id: Set(association.id),
            attachment_id: Set(association.attachment_id.into_inner()),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(self.conn)
        .await
        .map_err(to_repo_error)?;

        Ok(())
    }

    async fn clear_thumbnail(&self, post_id: PostId) -> Result<(), AttachmentError> {
        post_thumbnails::Entity::delete_many()
            .filter(post_thumbnails::Column::PostId.eq(post_id.into_inner()))
            .exec(self.conn)
            .await
            .map_err(to_repo_error)?;

        Ok(())
    }
}

fn to_repo_error(err: DbErr) -> AttachmentError {
    AttachmentError::repository(err.to_string())
}

/// Convert database model to domain model.
fn to_domain(model: attachments::Model) -> Attachment {
    Attachment {
        id: AttachmentId::from_i64(model.id),
        post_id: PostId::from_i64(model.post_id),
        original_name: model.original_name,
        stored_name: model.stored_name,
        extension: model.extension,
        size_bytes: model.size_bytes,
    }
}
