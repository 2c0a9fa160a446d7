//! Database seeder for Corkboard development and testing.
//!
//! Seeds demo members and a handful of posts with comments so a freshly
//! migrated database has something to browse.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use corkboard_core::member::hash_password;
use corkboard_db::entities::{
    comments, members, posts,
    sea_orm_active_enums::{MemberRole, PostCategory},
};

/// Password shared by all seeded accounts.
const DEMO_PASSWORD: &str = "corkboard-demo";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = corkboard_db::connect(&database_url, 5, 1)
        .await
        .expect("Failed to connect to database");

    println!("Seeding members...");
    let manager_id = seed_member(&db, "manager@corkboard.dev", "Board Manager", true).await;
    let alice_id = seed_member(&db, "alice@corkboard.dev", "Alice", false).await;
    let bob_id = seed_member(&db, "bob@corkboard.dev", "Bob", false).await;

    println!("Seeding posts...");
    seed_posts(&db, manager_id, alice_id, bob_id).await;

    println!("Seeding complete!");
    println!("  All accounts use the password: {DEMO_PASSWORD}");
}

/// Seeds a member if the email is not already taken. Returns the row id.
async fn seed_member(db: &DatabaseConnection, email: &str, nickname: &str, manager: bool) -> i64 {
    if let Ok(Some(existing)) = members::Entity::find()
        .filter(members::Column::Email.eq(email))
        .one(db)
        .await
    {
        println!("  Member {email} already exists, skipping...");
        return existing.id;
    }

    let password_hash = hash_password(DEMO_PASSWORD).expect("Failed to hash demo password");
    let member = members::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        nickname: Set(nickname.to_string()),
        role: Set(if manager {
            MemberRole::Manager
        } else {
            MemberRole::Member
        }),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    match member.insert(db).await {
        Ok(model) => {
            println!("  Created member: {email}");
            model.id
        }
        Err(e) => {
            eprintln!("Failed to insert member {email}: {e}");
            std::process::exit(1);
        }
    }
}

/// Seeds one post per category plus a few comments, once.
async fn seed_posts(db: &DatabaseConnection, manager_id: i64, alice_id: i64, bob_id: i64) {
    let existing = posts::Entity::find().count(db).await.unwrap_or(0);
    if existing > 0 {
        println!("  Posts already exist, skipping...");
        return;
    }

    let seed_data = [
        (
            PostCategory::Notice,
            manager_id,
            "Welcome to Corkboard",
            "House rules: keep it civil, keep it on topic. Notices are posted by managers only.",
        ),
        (
            PostCategory::Community,
            alice_id,
            "Anyone up for a board game night?",
            "Thinking Thursday evening in the common room. Bring snacks.",
        ),
        (
            PostCategory::Photo,
            bob_id,
            "Sunset from the roof",
            "Caught this last weekend. Attachments welcome on photo posts.",
        ),
        (
            PostCategory::Inquiry,
            alice_id,
            "How do I change my nickname?",
            "Could not find a setting for this, is it supported yet?",
        ),
    ];

    for (category, author_id, title, body) in seed_data {
        let post = posts::ActiveModel {
            category: Set(category),
            title: Set(title.to_string()),
            body: Set(body.to_string()),
            author_id: Set(author_id),
            view_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        match post.insert(db).await {
            Ok(model) => {
                println!("  Created post: {title}");
                seed_comment(db, model.id, bob_id, "First!").await;
            }
            Err(e) => eprintln!("Failed to insert post {title}: {e}"),
        }
    }
}

async fn seed_comment(db: &DatabaseConnection, post_id: i64, author_id: i64, body: &str) {
    let comment = comments::ActiveModel {
        post_id: Set(post_id),
        author_id: Set(author_id),
        body: Set(body.to_string()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    if let Err(e) = comment.insert(db).await {
        eprintln!("Failed to insert comment on post {post_id}: {e}");
    }
}
