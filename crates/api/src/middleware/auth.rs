//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chronicis_core::error::CoreError;
use chronicis_core::types::DbId;
use chronicis_core::validation::MAX_DISPLAY_NAME_LENGTH;
use chronicis_db::models::user::UserIdentity;
use chronicis_db::repositories::UserRepo;

use crate::auth::jwt::{validate_token, Claims};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// The first request from a new subject creates the local `users` row; later
/// requests refresh the profile when the token carries newer values.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %auth.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Internal user id.
    pub user_id: DbId,
    /// External subject from `claims.sub`.
    pub subject: String,
    pub display_name: String,
    /// Subject is listed in `SYSADMIN_SUBJECTS`.
    pub is_sysadmin: bool,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        if claims.sub.trim().is_empty() {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Token has no subject".into(),
            )));
        }

        let user = UserRepo::get_or_create(&state.pool, &identity_from_claims(&claims)).await?;

        Ok(AuthUser {
            user_id: user.id,
            is_sysadmin: state.config.is_sysadmin(&claims.sub),
            subject: claims.sub,
            display_name: user.display_name,
        })
    }
}

/// Profile fields for the `users` row, falling back to the email's local
/// part and then to "Unknown User" for the display name.
fn identity_from_claims(claims: &Claims) -> UserIdentity {
    let email = claims.email.clone().unwrap_or_default();
    let display_name = claims
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| {
            email
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown User".to_string());

    UserIdentity {
        auth_subject: claims.sub.clone(),
        email,
        display_name: display_name.chars().take(MAX_DISPLAY_NAME_LENGTH).collect(),
        avatar_url: claims.picture.clone().filter(|p| !p.trim().is_empty()),
    }
}
