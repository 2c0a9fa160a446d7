//! Post reaction routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::{internal_error, not_found};
use crate::{AppState, middleware::AuthMember};
use corkboard_db::entities::sea_orm_active_enums::ReactionKind;
use corkboard_db::{PostRepository, ReactionRepository};
use corkboard_shared::types::PostId;

/// Creates the reaction routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/posts/{id}/reactions", post(toggle_reaction))
}

/// Request body for toggling a reaction.
#[derive(Debug, Deserialize)]
struct ToggleRequest {
    kind: ReactionKind,
}

/// POST /posts/{id}/reactions - Toggle the caller's reaction on a post.
async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthMember,
    Path(id): Path<i64>,
    Json(payload): Json<ToggleRequest>,
) -> impl IntoResponse {
    let post_id = PostId::from_i64(id);

    let post_repo = PostRepository::new((*state.db).clone());
    match post_repo.find_by_id(post_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Post"),
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load post");
            return internal_error();
        }
    }

    let reaction_repo = ReactionRepository::new((*state.db).clone());
    let outcome = match reaction_repo
        .toggle(post_id, auth.member_id(), payload.kind)
        .await
    {
        Ok(o) => o,
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to toggle reaction");
            return internal_error();
        }
    };

    let counts = match reaction_repo.counts(post_id).await {
        Ok(c) => c,
        Err(e) => {
            error!(post_id = %post_id, error = %e, "Failed to load reaction counts");
            return internal_error();
        }
    };

    info!(post_id = %post_id, outcome = ?outcome, "Reaction toggled");

    Json(json!({
        "outcome": outcome,
        "likes": counts.likes,
        "dislikes": counts.dislikes
    }))
    .into_response()
}
