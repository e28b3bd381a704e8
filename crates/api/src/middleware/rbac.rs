//! Role-based access extractors.
//!
//! World roles depend on the world in the path, so they are checked in
//! [`crate::access`]. Only the global system administrator role is enforced
//! at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chronicis_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a subject listed in `SYSADMIN_SUBJECTS`. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireSysAdmin(user): RequireSysAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireSysAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireSysAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_sysadmin {
            return Err(AppError::Core(CoreError::Forbidden(
                "System administrator access required".into(),
            )));
        }
        Ok(RequireSysAdmin(user))
    }
}
