//! Handlers for `/worlds`: creation, listing, settings and public sharing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::kinds::WorldRole;
use chronicis_core::slug::{generate_slug, unique_slug};
use chronicis_core::types::DbId;
use chronicis_core::validation::{
    normalize_public_slug, optional_text, public_slug_error, require_text,
    MAX_WORLD_DESCRIPTION_LENGTH, MAX_WORLD_NAME_LENGTH,
};
use chronicis_db::models::campaign::{ActiveContext, Campaign};
use chronicis_db::models::world::{
    CheckPublicSlug, CreateWorld, NewWorld, PublicSlugCheck, UpdateWorld, World, WorldChanges,
};
use chronicis_db::repositories::{ArcRepo, CampaignRepo, WorldRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::access::world_access;
use crate::error::AppResult;
use crate::handlers::arc::redact_arc;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// How many numbered variants to try when suggesting a free public slug.
const MAX_PUBLIC_SLUG_SUGGESTIONS: usize = 100;

/// A world with the caller's role and its campaigns.
#[derive(Debug, Serialize)]
pub struct WorldDetail {
    #[serde(flatten)]
    pub world: World,
    pub role: WorldRole,
    pub is_owner: bool,
    pub campaigns: Vec<Campaign>,
}

/* --------------------------------------------------------------------------
World CRUD
-------------------------------------------------------------------------- */

/// GET /api/v1/worlds
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let worlds = WorldRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: worlds }))
}

/// POST /api/v1/worlds
///
/// The creator becomes the owner and first GM; starter articles, a campaign
/// and an arc are seeded in the same transaction.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateWorld>,
) -> AppResult<impl IntoResponse> {
    let name = require_text("World name", &input.name, MAX_WORLD_NAME_LENGTH)?;
    let description = optional_text(
        "Description",
        input.description.as_deref(),
        MAX_WORLD_DESCRIPTION_LENGTH,
    )?;

    let taken = WorldRepo::slugs_for_owner(&state.pool, auth.user_id, None).await?;
    let slug = unique_slug(&generate_slug(&name), &taken);

    let world = WorldRepo::create_with_defaults(
        &state.pool,
        &NewWorld {
            name,
            slug,
            description,
            owner_id: auth.user_id,
        },
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, world_id = %world.id, "World created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: world })))
}

/// GET /api/v1/worlds/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let access = world_access(&state.pool, id, auth.user_id).await?;
    let campaigns = CampaignRepo::list_for_world(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: WorldDetail {
            is_owner: access.is_owner(),
            role: access.role,
            world: access.world,
            campaigns,
        },
    }))
}

/// PUT /api/v1/worlds/{id}
///
/// Owner only. Renaming regenerates the slug. Making a world public requires
/// an available public slug; making it private clears the slug.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorld>,
) -> AppResult<impl IntoResponse> {
    let access = world_access(&state.pool, id, auth.user_id).await?;
    access.require_owner()?;
    let world = access.world;

    let (name, slug) = match input.name.as_deref() {
        Some(raw) => {
            let name = require_text("World name", raw, MAX_WORLD_NAME_LENGTH)?;
            if name == world.name {
                (name, world.slug.clone())
            } else {
                let taken = WorldRepo::slugs_for_owner(&state.pool, world.owner_id, Some(id)).await?;
                let slug = unique_slug(&generate_slug(&name), &taken);
                (name, slug)
            }
        }
        None => (world.name.clone(), world.slug.clone()),
    };

    let description = match input.description.as_deref() {
        Some(raw) => optional_text("Description", Some(raw), MAX_WORLD_DESCRIPTION_LENGTH)?,
        None => world.description.clone(),
    };

    let is_public = input.is_public.unwrap_or(world.is_public);
    let public_slug = if is_public {
        let requested = input
            .public_slug
            .as_deref()
            .map(normalize_public_slug)
            .or_else(|| world.public_slug.clone())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                CoreError::Validation("A public slug is required to make a world public".into())
            })?;
        if let Some(reason) = public_slug_error(&requested) {
            return Err(CoreError::Validation(reason).into());
        }
        if WorldRepo::public_slug_taken(&state.pool, &requested, Some(id)).await? {
            return Err(CoreError::Conflict(format!(
                "The public slug '{requested}' is already in use"
            ))
            .into());
        }
        Some(requested)
    } else {
        None
    };

    let updated = WorldRepo::update(
        &state.pool,
        id,
        &WorldChanges {
            name,
            slug,
            description,
            is_public,
            public_slug,
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("World", id))?;

    tracing::info!(
        user_id = %auth.user_id,
        world_id = %id,
        is_public = updated.is_public,
        "World updated"
    );

    Ok(Json(DataResponse { data: updated }))
}

/* --------------------------------------------------------------------------
Public sharing
-------------------------------------------------------------------------- */

/// POST /api/v1/worlds/{id}/check-public-slug
pub async fn check_public_slug(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CheckPublicSlug>,
) -> AppResult<impl IntoResponse> {
    let access = world_access(&state.pool, id, auth.user_id).await?;
    access.require_owner()?;

    let slug = normalize_public_slug(&input.slug);
    let check = public_slug_check(&state.pool, id, &slug).await?;
    Ok(Json(DataResponse { data: check }))
}

async fn public_slug_check(pool: &PgPool, world_id: DbId, slug: &str) -> AppResult<PublicSlugCheck> {
    if let Some(reason) = public_slug_error(slug) {
        return Ok(PublicSlugCheck {
            is_available: false,
            validation_error: Some(reason),
            suggested_slug: None,
        });
    }
    if !WorldRepo::public_slug_taken(pool, slug, Some(world_id)).await? {
        return Ok(PublicSlugCheck {
            is_available: true,
            validation_error: None,
            suggested_slug: None,
        });
    }

    let mut suggested_slug = None;
    for n in 2..=MAX_PUBLIC_SLUG_SUGGESTIONS {
        let candidate = format!("{slug}-{n}");
        if public_slug_error(&candidate).is_none()
            && !WorldRepo::public_slug_taken(pool, &candidate, Some(world_id)).await?
        {
            suggested_slug = Some(candidate);
            break;
        }
    }
    Ok(PublicSlugCheck {
        is_available: false,
        validation_error: None,
        suggested_slug,
    })
}

/* --------------------------------------------------------------------------
Active context
-------------------------------------------------------------------------- */

/// GET /api/v1/worlds/{id}/active-context
///
/// The active campaign (or the only one) and its active arc (or the last by
/// sort order).
pub async fn active_context(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let access = world_access(&state.pool, id, auth.user_id).await?;

    let campaign = CampaignRepo::current_for_world(&state.pool, id).await?;
    let arc = match &campaign {
        Some(c) => ArcRepo::current_for_campaign(&state.pool, c.id)
            .await?
            .map(|arc| redact_arc(arc, &access)),
        None => None,
    };

    Ok(Json(DataResponse {
        data: ActiveContext {
            world_id: id,
            campaign,
            arc,
        },
    }))
}
