//! Post reaction repository for database operations.
//!
//! Reactions toggle: sending the kind a member already left removes it,
//! a different kind re-points the existing row.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use serde::Serialize;

use corkboard_shared::types::{MemberId, PostId};

use crate::entities::{post_reactions, sea_orm_active_enums::ReactionKind};

/// Outcome of toggling a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionOutcome {
    /// The member had no reaction on the post; one was created.
    Added,
    /// The member re-sent their current kind; the reaction was removed.
    Removed,
    /// The member sent the other kind; the reaction was re-pointed.
    Switched,
}

/// Per-post reaction tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReactionCounts {
    /// Number of likes.
    pub likes: u64,
    /// Number of dislikes.
    pub dislikes: u64,
}

/// Reaction repository for toggle and count operations.
#[derive(Debug, Clone)]
pub struct ReactionRepository {
    db: DatabaseConnection,
}

impl ReactionRepository {
    /// Creates a new reaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Toggles a member's reaction on a post.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn toggle(
        &self,
        post_id: PostId,
        member_id: MemberId,
        kind: ReactionKind,
    ) -> Result<ReactionOutcome, DbErr> {
        let existing = post_reactions::Entity::find()
            .filter(post_reactions::Column::PostId.eq(post_id.into_inner()))
            .filter(post_reactions::Column::MemberId.eq(member_id.into_inner()))
            .one(&self.db)
            .await?;

        match existing {
            Some(reaction) if reaction.kind == kind => {
                post_reactions::Entity::delete_by_id(reaction.id)
                    .exec(&self.db)
                    .await?;
                Ok(ReactionOutcome::Removed)
            }
            Some(reaction) => {
                post_reactions::ActiveModel {
                    id: Set(reaction.id),
                    kind: Set(kind),
                    ..Default::default()
                }
                .update(&self.db)
                .await?;
                Ok(ReactionOutcome::Switched)
            }
            None => {
                post_reactions::ActiveModel {
                    post_id: Set(post_id.into_inner()),
                    member_id: Set(member_id.into_inner()),
                    kind: Set(kind),
                    created_at: Set(chrono::Utc::now().into()),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
                Ok(ReactionOutcome::Added)
            }
        }
    }

    /// Counts likes and dislikes for a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn counts(&self, post_id: PostId) -> Result<ReactionCounts, DbErr> {
        let likes = post_reactions::Entity::find()
            .filter(post_reactions::Column::PostId.eq(post_id.into_inner()))
            .filter(post_reactions::Column::Kind.eq(ReactionKind::Like))
            .count(&self.db)
            .await?;
        let dislikes = post_reactions::Entity::find()
            .filter(post_reactions::Column::PostId.eq(post_id.into_inner()))
            .filter(post_reactions::Column::Kind.eq(ReactionKind::Dislike))
            .count(&self.db)
            .await?;

        Ok(ReactionCounts { likes, dislikes })
    }
}
