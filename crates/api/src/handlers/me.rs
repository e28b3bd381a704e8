//! Handler for the current user's profile.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_db::models::user::User;
use chronicis_db::repositories::UserRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Me {
    #[serde(flatten)]
    pub user: User,
    pub is_sysadmin: bool,
}

/// GET /api/v1/me
pub async fn get_me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;
    Ok(Json(DataResponse {
        data: Me {
            user,
            is_sysadmin: auth.is_sysadmin,
        },
    }))
}
