//! Route definitions for `/campaigns`, `/arcs` and `/sessions`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{arc, campaign, quest, session};
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// POST   /{id}/activate    -> activate
/// GET    /{id}/arcs        -> arc::list_by_campaign
/// POST   /{id}/arcs        -> arc::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(campaign::get_by_id).put(campaign::update))
        .route("/{id}/activate", post(campaign::activate))
        .route("/{id}/arcs", get(arc::list_by_campaign).post(arc::create))
}

/// Routes mounted at `/arcs`.
///
/// ```text
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// POST   /{id}/activate    -> activate
/// GET    /{id}/sessions    -> session::list_by_arc
/// POST   /{id}/sessions    -> session::create
/// GET    /{id}/quests      -> quest::list_by_arc
/// POST   /{id}/quests      -> quest::create
/// ```
pub fn arc_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(arc::get_by_id).put(arc::update).delete(arc::delete),
        )
        .route("/{id}/activate", post(arc::activate))
        .route(
            "/{id}/sessions",
            get(session::list_by_arc).post(session::create),
        )
        .route("/{id}/quests", get(quest::list_by_arc).post(quest::create))
}

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET    /{id}    -> get_by_id
/// PATCH  /{id}    -> update_notes
/// ```
pub fn session_router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(session::get_by_id).patch(session::update_notes),
    )
}
