//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Board member role.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "member_role")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
    /// Board manager.
    #[sea_orm(string_value = "manager")]
    Manager,
}

/// Board section a post belongs to.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "post_category")]
#[serde(rename_all = "snake_case")]
pub enum PostCategory {
    /// Official announcements.
    #[sea_orm(string_value = "notice")]
    Notice,
    /// General discussion.
    #[sea_orm(string_value = "community")]
    Community,
    /// Image posts.
    #[sea_orm(string_value = "photo")]
    Photo,
    /// Questions to managers.
    #[sea_orm(string_value = "inquiry")]
    Inquiry,
}

/// Reaction a member left on a post.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reaction_kind")]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    /// Thumbs up.
    #[sea_orm(string_value = "like")]
    Like,
    /// Thumbs down.
    #[sea_orm(string_value = "dislike")]
    Dislike,
}
