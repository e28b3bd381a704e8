//! System administration endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::types::DbId;
use chronicis_db::repositories::WorldRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireSysAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/worlds
pub async fn list_worlds(
    RequireSysAdmin(_admin): RequireSysAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let worlds = WorldRepo::admin_summaries(&state.pool).await?;
    Ok(Json(DataResponse { data: worlds }))
}

/// DELETE /api/v1/admin/worlds/{id}
///
/// Deletes the world and everything in it, then its stored documents.
pub async fn delete_world(
    RequireSysAdmin(admin): RequireSysAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let blob_paths = WorldRepo::document_blob_paths(&state.pool, id).await?;
    if !WorldRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("World", id).into());
    }

    for path in &blob_paths {
        if let Err(e) = state.blob_store.delete(path).await {
            tracing::warn!(world_id = %id, blob = %path, error = %e, "Failed to delete document blob");
        }
    }

    tracing::warn!(
        admin_id = %admin.user_id,
        world_id = %id,
        documents = blob_paths.len(),
        "World deleted by administrator"
    );
    Ok(StatusCode::NO_CONTENT)
}
