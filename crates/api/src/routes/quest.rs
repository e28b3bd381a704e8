//! Route definitions for the `/quests` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::quest;
use crate::state::AppState;

/// Routes mounted at `/quests`.
///
/// ```text
/// GET    /{id}                        -> get_by_id
/// PUT    /{id}                        -> update
/// DELETE /{id}                        -> delete
/// GET    /{id}/updates?skip=&take=    -> list_updates
/// POST   /{id}/updates                -> create_update
/// DELETE /{id}/updates/{update_id}    -> delete_update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(quest::get_by_id).put(quest::update).delete(quest::delete),
        )
        .route(
            "/{id}/updates",
            get(quest::list_updates).post(quest::create_update),
        )
        .route("/{id}/updates/{update_id}", delete(quest::delete_update))
}
