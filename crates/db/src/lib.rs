//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the board's tables
//! - Repositories for data access, including the adapter implementing
//!   the attachment engine's persistence port
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    CommentRepository, MemberRepository, PostRepository, ReactionRepository,
    SeaAttachmentRepository, SessionRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// Per-statement sqlx logging is noisy; it is switched on only when
/// `CORKBOARD_SQLX_LOG` is set.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(max_connections)
        .min_connections(min_connections)
        .sqlx_logging(std::env::var("CORKBOARD_SQLX_LOG").is_ok());

    Database::connect(options).await
}
