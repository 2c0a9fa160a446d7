//! Post repository for database operations.

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use corkboard_core::post::{PostCategory, PostSearchFilter};
use corkboard_shared::types::{MemberId, PageRequest, PostId};

use crate::entities::{members, posts, sea_orm_active_enums::PostCategory as DbPostCategory};

/// Post repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Creates a new post repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        category: PostCategory,
        title: &str,
        body: &str,
        author_id: MemberId,
    ) -> Result<posts::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let post = posts::ActiveModel {
            category: Set(to_db_category(category)),
            title: Set(title.to_string()),
            body: Set(body.to_string()),
            author_id: Set(author_id.into_inner()),
            view_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        post.insert(&self.db).await
    }

    /// Finds a post by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: PostId) -> Result<Option<posts::Model>, DbErr> {
        posts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Finds a post by ID together with its author.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_with_author(
        &self,
        id: PostId,
    ) -> Result<Option<(posts::Model, Option<members::Model>)>, DbErr> {
        posts::Entity::find_by_id(id.into_inner())
            .find_also_related(members::Entity)
            .one(&self.db)
            .await
    }

    /// Lists a page of posts with their authors, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_page(
        &self,
        filter: &PostSearchFilter,
        page: &PageRequest,
    ) -> Result<(Vec<(posts::Model, Option<members::Model>)>, u64), DbErr> {
        let mut query = posts::Entity::find();

        if let Some(category) = filter.category {
            query = query.filter(posts::Column::Category.eq(to_db_category(category)));
        }
        if let Some(keyword) = filter.normalized_keyword() {
            let pattern = format!("%{keyword}%");
            query = query.filter(
                Condition::any()
                    .add(Expr::col((posts::Entity, posts::Column::Title)).ilike(pattern.clone()))
                    .add(Expr::col((posts::Entity, posts::Column::Body)).ilike(pattern)),
            );
        }

        let total = query.clone().count(&self.db).await?;

        let rows = query
            .find_also_related(members::Entity)
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Updates a post's title and body.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(
        &self,
        id: PostId,
        title: &str,
        body: &str,
    ) -> Result<posts::Model, DbErr> {
        posts::ActiveModel {
            id: Set(id.into_inner()),
            title: Set(title.to_string()),
            body: Set(body.to_string()),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await
    }

    /// Deletes a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: PostId) -> Result<bool, DbErr> {
        let result = posts::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Increments a post's view counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn increment_view_count(&self, id: PostId) -> Result<(), DbErr> {
        posts::Entity::update_many()
            .col_expr(
                posts::Column::ViewCount,
                Expr::col(posts::Column::ViewCount).add(1),
            )
            .filter(posts::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await?;

        Ok(())
    }
}

/// Convert a domain category to the database enum.
#[must_use]
pub fn to_db_category(category: PostCategory) -> DbPostCategory {
    match category {
        PostCategory::Notice => DbPostCategory::Notice,
        PostCategory::Community => DbPostCategory::Community,
        PostCategory::Photo => DbPostCategory::Photo,
        PostCategory::Inquiry => DbPostCategory::Inquiry,
    }
}

/// Convert a database category to the domain enum.
#[must_use]
pub fn from_db_category(category: &DbPostCategory) -> PostCategory {
    match category {
        DbPostCategory::Notice => PostCategory::Notice,
        DbPostCategory::Community => PostCategory::Community,
        DbPostCategory::Photo => PostCategory::Photo,
        DbPostCategory::Inquiry => PostCategory::Inquiry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping_round_trip() {
        for category in [
            PostCategory::Notice,
            PostCategory::Community,
            PostCategory::Photo,
            PostCategory::Inquiry,
        ] {
            assert_eq!(from_db_category(&to_db_category(category)), category);
        }
    }
}
