//! Sysadmin-only routes.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /worlds         -> list_worlds
/// DELETE /worlds/{id}    -> delete_world
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/worlds", get(admin::list_worlds))
        .route("/worlds/{id}", delete(admin::delete_world))
}
