//! Comment repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use corkboard_shared::types::{CommentId, MemberId, PageRequest, PostId};

use crate::entities::{comments, members};

/// Comment repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    db: DatabaseConnection,
}

impl CommentRepository {
    /// Creates a new comment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        post_id: PostId,
        author_id: MemberId,
        body: &str,
    ) -> Result<comments::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let comment = comments::ActiveModel {
            post_id: Set(post_id.into_inner()),
            author_id: Set(author_id.into_inner()),
            body: Set(body.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        comment.insert(&self.db).await
    }

    /// Finds a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: CommentId) -> Result<Option<comments::Model>, DbErr> {
        comments::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Lists a page of a post's comments with their authors, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_page_by_post(
        &self,
        post_id: PostId,
        page: &PageRequest,
    ) -> Result<(Vec<(comments::Model, Option<members::Model>)>, u64), DbErr> {
        let query =
            comments::Entity::find().filter(comments::Column::PostId.eq(post_id.into_inner()));

        let total = query.clone().count(&self.db).await?;

        let rows = query
            .find_also_related(members::Entity)
            .order_by_asc(comments::Column::CreatedAt)
            .order_by_asc(comments::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Updates a comment's body.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(&self, id: CommentId, body: &str) -> Result<comments::Model, DbErr> {
        comments::ActiveModel {
            id: Set(id.into_inner()),
            body: Set(body.to_string()),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await
    }

    /// Deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: CommentId) -> Result<bool, DbErr> {
        let result = comments::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
