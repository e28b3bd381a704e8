//! Handlers for campaigns within a world.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::types::DbId;
use chronicis_core::validation::{normalize_optional, require_text, MAX_CAMPAIGN_NAME_LENGTH};
use chronicis_db::models::campaign::{ArcWithCounts, Campaign, CreateCampaign, UpdateCampaign};
use chronicis_db::repositories::{ArcRepo, CampaignRepo};
use serde::Serialize;

use crate::access::{campaign_access, world_access};
use crate::error::AppResult;
use crate::handlers::arc::redact_arc;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub arcs: Vec<ArcWithCounts>,
}

/// GET /api/v1/worlds/{id}/campaigns
pub async fn list_by_world(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id).await?;
    let campaigns = CampaignRepo::list_for_world(&state.pool, world_id).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

/// POST /api/v1/worlds/{id}/campaigns
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
    Json(input): Json<CreateCampaign>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_gm()?;

    let input = CreateCampaign {
        name: require_text("Campaign name", &input.name, MAX_CAMPAIGN_NAME_LENGTH)?,
        description: normalize_optional(input.description.as_deref()),
    };
    let campaign = CampaignRepo::create(&state.pool, world_id, auth.user_id, &input).await?;

    tracing::info!(
        user_id = %auth.user_id,
        world_id = %world_id,
        campaign_id = %campaign.id,
        "Campaign created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (campaign, access) = campaign_access(&state.pool, id, auth.user_id).await?;
    let arcs = ArcRepo::list_for_campaign(&state.pool, id)
        .await?
        .into_iter()
        .map(|a| ArcWithCounts {
            arc: redact_arc(a.arc, &access),
            session_count: a.session_count,
        })
        .collect();
    Ok(Json(DataResponse {
        data: CampaignDetail { campaign, arcs },
    }))
}

/// PUT /api/v1/campaigns/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCampaign>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = campaign_access(&state.pool, id, auth.user_id).await?;
    access.require_gm()?;

    let input = UpdateCampaign {
        name: input
            .name
            .as_deref()
            .map(|n| require_text("Campaign name", n, MAX_CAMPAIGN_NAME_LENGTH))
            .transpose()?,
        description: input.description,
    };
    let campaign = CampaignRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Campaign", id))?;

    tracing::info!(user_id = %auth.user_id, campaign_id = %id, "Campaign updated");
    Ok(Json(DataResponse { data: campaign }))
}

/// POST /api/v1/campaigns/{id}/activate
pub async fn activate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = campaign_access(&state.pool, id, auth.user_id).await?;
    access.require_gm()?;

    let campaign = CampaignRepo::activate(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Campaign", id))?;

    tracing::info!(
        user_id = %auth.user_id,
        world_id = %campaign.world_id,
        campaign_id = %id,
        "Campaign activated"
    );
    Ok(Json(DataResponse { data: campaign }))
}
