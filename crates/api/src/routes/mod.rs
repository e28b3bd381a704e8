pub mod admin;
pub mod article;
pub mod campaign;
pub mod character;
pub mod health;
pub mod public;
pub mod quest;
pub mod world;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /me                                          current user (GET)
/// /dashboard                                   dashboard (GET)
/// /search?query=                               search readable worlds (GET)
///
/// /worlds                                      list, create
/// /worlds/join                                 join by invitation code (POST)
/// /worlds/{id}                                 get, update
/// /worlds/{id}/check-public-slug               slug availability (POST)
/// /worlds/{id}/active-context                  active campaign and arc (GET)
/// /worlds/{id}/members[/{member_id}]           list, change role, remove
/// /worlds/{id}/invitations[/{invitation_id}]   list, create, revoke
/// /worlds/{id}/campaigns                       list, create
/// /worlds/{id}/links[/{link_id}]               external links CRUD
/// /worlds/{id}/documents/...                   document upload and download
/// /worlds/{id}/hashtags                        hashtags in use (GET)
/// /worlds/{id}/link-suggestions?query=         wiki link autocomplete (GET)
///
/// /campaigns/{id}                              get, update
/// /campaigns/{id}/activate                     make active (POST)
/// /campaigns/{id}/arcs                         list, create
///
/// /arcs/{id}                                   get, update, delete
/// /arcs/{id}/activate                          make active (POST)
/// /arcs/{id}/sessions                          list, create
/// /arcs/{id}/quests                            list, create
///
/// /sessions/{id}                               get, update notes (PATCH)
///
/// /quests/{id}                                 get, update, delete
/// /quests/{id}/updates[/{update_id}]           list, add, delete
///
/// /articles                                    roots, create
/// /articles/all                                flat list (GET)
/// /articles/by-path/{*path}                    resolve slug path (GET)
/// /articles/resolve-links                      bulk link lookup (POST)
/// /articles/{id}                               get, update, delete
/// /articles/{id}/children                      children (GET)
/// /articles/{id}/move                          reparent (PUT)
/// /articles/{id}/aliases                       replace aliases (PUT)
/// /articles/{id}/summary                       get, clear
/// /articles/{id}/backlinks                     incoming links (GET)
/// /articles/{id}/outgoing-links                outgoing links (GET)
/// /articles/{id}/auto-link                     find linkable text (POST)
///
/// /characters/claimed                          my characters (GET)
/// /characters/{id}/claim                       status, claim, release
///
/// /public/worlds/{public_slug}                 public world (no auth)
/// /public/worlds/{public_slug}/articles        public tree (no auth)
/// /public/worlds/{public_slug}/articles/{*path} public article (no auth)
///
/// /admin/worlds[/{id}]                         list, delete (sysadmin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::me::get_me))
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/search", get(handlers::search::search))
        // Worlds and everything hanging off a world.
        .nest("/worlds", world::router())
        // Campaign structure.
        .nest("/campaigns", campaign::router())
        .nest("/arcs", campaign::arc_router())
        .nest("/sessions", campaign::session_router())
        .nest("/quests", quest::router())
        // Wiki content.
        .nest("/articles", article::router())
        .nest("/characters", character::router())
        // Anonymous access.
        .nest("/public/worlds", public::router())
        // Sysadmin.
        .nest("/admin", admin::router())
}
