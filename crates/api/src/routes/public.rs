//! Unauthenticated routes for public worlds.

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public/worlds`.
///
/// ```text
/// GET /{public_slug}                     -> get_world
/// GET /{public_slug}/articles            -> get_tree
/// GET /{public_slug}/articles/{*path}    -> get_article
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{public_slug}", get(public::get_world))
        .route("/{public_slug}/articles", get(public::get_tree))
        .route("/{public_slug}/articles/{*path}", get(public::get_article))
}
