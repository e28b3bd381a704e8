//! Handlers for arcs within a campaign.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::types::DbId;
use chronicis_core::validation::{normalize_optional, require_text, MAX_ARC_NAME_LENGTH};
use chronicis_db::models::campaign::{ArcWithCounts, CreateArc, StoryArc, UpdateArc};
use chronicis_db::repositories::ArcRepo;

use crate::access::{arc_access, campaign_access, WorldAccess};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Hide private notes from everyone but GMs and the arc's creator.
pub fn redact_arc(mut arc: StoryArc, access: &WorldAccess) -> StoryArc {
    if !access.is_gm() && arc.created_by != access.user_id {
        arc.private_notes = None;
    }
    arc
}

/// GET /api/v1/campaigns/{id}/arcs
pub async fn list_by_campaign(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = campaign_access(&state.pool, campaign_id, auth.user_id).await?;
    let arcs: Vec<ArcWithCounts> = ArcRepo::list_for_campaign(&state.pool, campaign_id)
        .await?
        .into_iter()
        .map(|a| ArcWithCounts {
            arc: redact_arc(a.arc, &access),
            session_count: a.session_count,
        })
        .collect();
    Ok(Json(DataResponse { data: arcs }))
}

/// POST /api/v1/campaigns/{id}/arcs
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Json(input): Json<CreateArc>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = campaign_access(&state.pool, campaign_id, auth.user_id).await?;
    access.require_gm()?;

    let input = CreateArc {
        name: require_text("Arc name", &input.name, MAX_ARC_NAME_LENGTH)?,
        description: normalize_optional(input.description.as_deref()),
        private_notes: input.private_notes,
        sort_order: input.sort_order,
    };
    let arc = ArcRepo::create(&state.pool, campaign_id, auth.user_id, &input).await?;

    tracing::info!(
        user_id = %auth.user_id,
        campaign_id = %campaign_id,
        arc_id = %arc.id,
        "Arc created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: arc })))
}

/// GET /api/v1/arcs/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (arc, access) = arc_access(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: redact_arc(arc, &access),
    }))
}

/// PUT /api/v1/arcs/{id}
///
/// GMs and the arc's creator may edit.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateArc>,
) -> AppResult<impl IntoResponse> {
    let (arc, access) = arc_access(&state.pool, id, auth.user_id).await?;
    if !access.is_gm() && arc.created_by != auth.user_id {
        return Err(CoreError::Forbidden("Only a GM or the arc's creator can edit it".into()).into());
    }

    let input = UpdateArc {
        name: input
            .name
            .as_deref()
            .map(|n| require_text("Arc name", n, MAX_ARC_NAME_LENGTH))
            .transpose()?,
        ..input
    };
    let arc = ArcRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Arc", id))?;

    tracing::info!(user_id = %auth.user_id, arc_id = %id, "Arc updated");
    Ok(Json(DataResponse {
        data: redact_arc(arc, &access),
    }))
}

/// DELETE /api/v1/arcs/{id}
///
/// Refused while the arc still has sessions.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let (_, access) = arc_access(&state.pool, id, auth.user_id).await?;
    access.require_gm()?;

    if ArcRepo::session_count(&state.pool, id).await? > 0 {
        return Err(CoreError::Validation(
            "Cannot delete an arc that has sessions. Delete its sessions first.".into(),
        )
        .into());
    }
    if !ArcRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Arc", id).into());
    }

    tracing::info!(user_id = %auth.user_id, arc_id = %id, "Arc deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/arcs/{id}/activate
pub async fn activate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = arc_access(&state.pool, id, auth.user_id).await?;
    access.require_gm()?;

    let arc = ArcRepo::activate(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Arc", id))?;

    tracing::info!(user_id = %auth.user_id, arc_id = %id, "Arc activated");
    Ok(Json(DataResponse { data: arc }))
}
