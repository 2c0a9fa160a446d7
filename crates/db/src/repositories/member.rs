//! Member repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

use corkboard_shared::auth::MemberRole;
use corkboard_shared::types::MemberId;

use crate::entities::{members, sea_orm_active_enums::MemberRole as DbMemberRole};

/// Member repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a member by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<members::Model>, DbErr> {
        members::Entity::find()
            .filter(members::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a member by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: MemberId) -> Result<Option<members::Model>, DbErr> {
        members::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Creates a new member.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        nickname: &str,
        role: MemberRole,
    ) -> Result<members::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let member = members::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            nickname: Set(nickname.to_string()),
            role: Set(to_db_role(role)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        member.insert(&self.db).await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = members::Entity::find()
            .filter(members::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}

/// Convert a domain role to the database enum.
#[must_use]
pub fn to_db_role(role: MemberRole) -> DbMemberRole {
    match role {
        MemberRole::Member => DbMemberRole::Member,
        MemberRole::Manager => DbMemberRole::Manager,
    }
}

/// Convert a database role to the domain enum.
#[must_use]
pub fn from_db_role(role: &DbMemberRole) -> MemberRole {
    match role {
        DbMemberRole::Member => MemberRole::Member,
        DbMemberRole::Manager => MemberRole::Manager,
    }
}
