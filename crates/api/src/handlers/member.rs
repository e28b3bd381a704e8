//! Handlers for `/worlds/{id}/members`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::kinds::WorldRole;
use chronicis_core::types::DbId;
use chronicis_db::models::member::{UpdateMemberRole, WorldMember};
use chronicis_db::repositories::MemberRepo;
use sqlx::PgPool;

use crate::access::world_access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/worlds/{id}/members
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id).await?;
    let members = MemberRepo::list(&state.pool, world_id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// PUT /api/v1/worlds/{id}/members/{member_id}
pub async fn update_role(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, member_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateMemberRole>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_gm()?;

    let member = member_in_world(&state.pool, world_id, member_id).await?;
    let demoting = member.role == WorldRole::Gm.as_str() && !input.role.is_gm();
    if demoting && MemberRepo::count_gms(&state.pool, world_id).await? <= 1 {
        return Err(CoreError::Validation("Cannot demote the last GM of a world".into()).into());
    }

    let updated = MemberRepo::update_role(&state.pool, member_id, input.role)
        .await?
        .ok_or_else(|| CoreError::not_found("Member", member_id))?;

    tracing::info!(
        user_id = %auth.user_id,
        world_id = %world_id,
        member_id = %member_id,
        role = %input.role,
        "Member role changed"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/worlds/{id}/members/{member_id}
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let access = world_access(&state.pool, world_id, auth.user_id).await?;
    access.require_gm()?;

    let member = member_in_world(&state.pool, world_id, member_id).await?;
    if member.user_id == access.world.owner_id {
        return Err(CoreError::Validation("The world owner cannot be removed".into()).into());
    }
    if member.role == WorldRole::Gm.as_str() && MemberRepo::count_gms(&state.pool, world_id).await? <= 1 {
        return Err(CoreError::Validation("Cannot remove the last GM of a world".into()).into());
    }

    MemberRepo::remove(&state.pool, member_id).await?;
    tracing::info!(
        user_id = %auth.user_id,
        world_id = %world_id,
        member_id = %member_id,
        "Member removed"
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn member_in_world(pool: &PgPool, world_id: DbId, member_id: DbId) -> AppResult<WorldMember> {
    MemberRepo::find_by_id(pool, member_id)
        .await?
        .filter(|m| m.world_id == world_id)
        .ok_or_else(|| CoreError::not_found("Member", member_id).into())
}
