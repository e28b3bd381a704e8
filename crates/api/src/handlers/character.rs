//! Handlers for players claiming character articles.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::kinds::ArticleType;
use chronicis_core::types::DbId;
use chronicis_db::repositories::ArticleRepo;
use serde::Serialize;

use crate::access::article_access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClaimStatus {
    pub article_id: DbId,
    pub is_claimed: bool,
    pub is_claimed_by_me: bool,
    pub player_id: Option<DbId>,
    pub player_name: Option<String>,
}

/// GET /api/v1/characters/claimed
pub async fn list_claimed(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let characters = ArticleRepo::claimed_characters(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: characters }))
}

/// GET /api/v1/characters/{id}/claim
pub async fn claim_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    article_access(&state.pool, id, auth.user_id).await?;
    let claim = ArticleRepo::claim(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Article", id))?;

    Ok(Json(DataResponse {
        data: ClaimStatus {
            article_id: claim.article_id,
            is_claimed: claim.player_id.is_some(),
            is_claimed_by_me: claim.player_id == Some(auth.user_id),
            player_id: claim.player_id,
            player_name: claim.player_name,
        },
    }))
}

/// POST /api/v1/characters/{id}/claim
pub async fn claim(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let found = article_access(&state.pool, id, auth.user_id).await?;
    if found.kind != ArticleType::Character {
        return Err(CoreError::Validation("Only character articles can be claimed".into()).into());
    }
    found.require_editor(&auth)?;

    if !ArticleRepo::set_claim(&state.pool, id, auth.user_id).await? {
        return Err(
            CoreError::Conflict("This character is already claimed by another player".into())
                .into(),
        );
    }

    tracing::info!(user_id = %auth.user_id, article_id = %id, "Character claimed");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/characters/{id}/claim
pub async fn unclaim(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    article_access(&state.pool, id, auth.user_id).await?;

    if !ArticleRepo::release_claim(&state.pool, id, auth.user_id).await? {
        return Err(
            CoreError::Forbidden("Only the player who claimed this character can release it".into())
                .into(),
        );
    }

    tracing::info!(user_id = %auth.user_id, article_id = %id, "Character unclaimed");
    Ok(StatusCode::NO_CONTENT)
}
