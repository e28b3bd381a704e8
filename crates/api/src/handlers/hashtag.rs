//! Handler for the hashtags used in a world.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::types::DbId;
use chronicis_db::repositories::HashtagRepo;

use crate::access::world_access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/worlds/{id}/hashtags
pub async fn list_by_world(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id).await?;
    let hashtags = HashtagRepo::list_for_world(&state.pool, world_id).await?;
    Ok(Json(DataResponse { data: hashtags }))
}
