//! `SeaORM` entity definitions for the board's tables.

pub mod attachments;
pub mod comments;
pub mod members;
pub mod post_reactions;
pub mod post_thumbnails;
pub mod posts;
pub mod sea_orm_active_enums;
pub mod sessions;
