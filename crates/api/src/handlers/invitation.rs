//! Handlers for world invitations and joining by code.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::invitation::{generate_code, is_valid_code_format, normalize_code, MAX_CODE_ATTEMPTS};
use chronicis_core::kinds::WorldRole;
use chronicis_core::types::{DbId, Timestamp};
use chronicis_db::models::member::{CreateInvitation, JoinWorld, NewInvitation};
use chronicis_db::repositories::{InvitationRepo, JoinOutcome, WorldRepo};
use serde::Serialize;

use crate::access::world_access;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a successful join.
#[derive(Debug, Serialize)]
pub struct JoinResult {
    pub world_id: DbId,
    pub world_name: String,
    pub role: WorldRole,
    pub joined_at: Timestamp,
}

/// GET /api/v1/worlds/{id}/invitations
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_gm()?;
    let invitations = InvitationRepo::list_for_world(&state.pool, world_id).await?;
    Ok(Json(DataResponse { data: invitations }))
}

/// POST /api/v1/worlds/{id}/invitations
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
    Json(input): Json<CreateInvitation>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_gm()?;

    let expires_at = match input.expires_in_days {
        Some(days) if days <= 0 => {
            return Err(CoreError::Validation("Expiry must be at least one day".into()).into())
        }
        Some(days) => Some(chrono::Utc::now() + chrono::Duration::days(days)),
        None => None,
    };
    if input.max_uses.is_some_and(|n| n <= 0) {
        return Err(CoreError::Validation("Maximum uses must be positive".into()).into());
    }

    let mut code = None;
    for _ in 0..MAX_CODE_ATTEMPTS {
        let candidate = generate_code();
        if !InvitationRepo::code_exists(&state.pool, &candidate).await? {
            code = Some(candidate);
            break;
        }
    }
    let code = code.ok_or_else(|| {
        AppError::InternalError("Could not generate a unique invitation code".into())
    })?;

    let invitation = InvitationRepo::create(
        &state.pool,
        &NewInvitation {
            world_id,
            code,
            role: input.role.unwrap_or(WorldRole::Player),
            created_by: auth.user_id,
            expires_at,
            max_uses: input.max_uses,
        },
    )
    .await?;

    tracing::info!(
        user_id = %auth.user_id,
        world_id = %world_id,
        invitation_id = %invitation.id,
        "Invitation created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: invitation })))
}

/// DELETE /api/v1/worlds/{id}/invitations/{invitation_id}
pub async fn revoke(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, invitation_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_gm()?;
    if !InvitationRepo::revoke(&state.pool, world_id, invitation_id).await? {
        return Err(CoreError::not_found("Invitation", invitation_id).into());
    }
    tracing::info!(
        user_id = %auth.user_id,
        world_id = %world_id,
        invitation_id = %invitation_id,
        "Invitation revoked"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/worlds/join
pub async fn join(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<JoinWorld>,
) -> AppResult<impl IntoResponse> {
    let code = normalize_code(&input.code);
    if !is_valid_code_format(&code) {
        return Err(AppError::BadRequest(
            "Invitation codes look like XXXX-XXXX".into(),
        ));
    }

    let member = match InvitationRepo::join(&state.pool, &code, auth.user_id).await? {
        JoinOutcome::Joined(member) => member,
        JoinOutcome::UnknownCode => {
            return Err(CoreError::NotFoundByKey {
                entity: "Invitation",
                key: code,
            }
            .into())
        }
        JoinOutcome::Inactive => {
            return Err(CoreError::Validation("This invitation has been revoked".into()).into())
        }
        JoinOutcome::Expired => {
            return Err(CoreError::Validation("This invitation has expired".into()).into())
        }
        JoinOutcome::Exhausted => {
            return Err(
                CoreError::Validation("This invitation has reached its maximum uses".into()).into(),
            )
        }
        JoinOutcome::AlreadyMember => {
            return Err(
                CoreError::Conflict("You are already a member of this world".into()).into(),
            )
        }
    };

    let world = WorldRepo::find_by_id(&state.pool, member.world_id)
        .await?
        .ok_or_else(|| CoreError::not_found("World", member.world_id))?;

    tracing::info!(user_id = %auth.user_id, world_id = %world.id, "Joined world by invitation");

    Ok(Json(DataResponse {
        data: JoinResult {
            world_id: world.id,
            world_name: world.name,
            role: WorldRole::from_name(&member.role)?,
            joined_at: member.joined_at,
        },
    }))
}
