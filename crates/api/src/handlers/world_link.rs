//! Handlers for external resource links pinned to a world.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::types::DbId;
use chronicis_core::validation::{
    normalize_optional, require_text, validate_url, MAX_LINK_TITLE_LENGTH,
};
use chronicis_db::models::world_link::WorldLinkInput;
use chronicis_db::repositories::WorldLinkRepo;

use crate::access::world_access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn validated(input: WorldLinkInput) -> AppResult<WorldLinkInput> {
    Ok(WorldLinkInput {
        url: validate_url(&input.url)?,
        title: require_text("Title", &input.title, MAX_LINK_TITLE_LENGTH)?,
        description: normalize_optional(input.description.as_deref()),
    })
}

/// GET /api/v1/worlds/{id}/links
pub async fn list_by_world(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id).await?;
    let links = WorldLinkRepo::list_for_world(&state.pool, world_id).await?;
    Ok(Json(DataResponse { data: links }))
}

/// POST /api/v1/worlds/{id}/links
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
    Json(input): Json<WorldLinkInput>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_gm()?;

    let link = WorldLinkRepo::create(&state.pool, world_id, &validated(input)?).await?;

    tracing::info!(user_id = %auth.user_id, world_id = %world_id, link_id = %link.id, "World link created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: link })))
}

/// PUT /api/v1/worlds/{id}/links/{link_id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<WorldLinkInput>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_gm()?;

    let link = WorldLinkRepo::update(&state.pool, world_id, id, &validated(input)?)
        .await?
        .ok_or_else(|| CoreError::not_found("World link", id))?;

    tracing::info!(user_id = %auth.user_id, world_id = %world_id, link_id = %id, "World link updated");
    Ok(Json(DataResponse { data: link }))
}

/// DELETE /api/v1/worlds/{id}/links/{link_id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_gm()?;

    if !WorldLinkRepo::delete(&state.pool, world_id, id).await? {
        return Err(CoreError::not_found("World link", id).into());
    }

    tracing::info!(user_id = %auth.user_id, world_id = %world_id, link_id = %id, "World link deleted");
    Ok(StatusCode::NO_CONTENT)
}
