//! Route definitions for the `/articles` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{article, link};
use crate::state::AppState;

/// Routes mounted at `/articles`.
///
/// ```text
/// GET    /?world_id=                 -> list_roots
/// POST   /                           -> create
/// GET    /all?world_id=              -> list_all
/// GET    /by-path/{*path}?world_id=  -> get_by_path
/// POST   /resolve-links              -> link::resolve
/// GET    /{id}                       -> get_by_id
/// PUT    /{id}                       -> update
/// DELETE /{id}                       -> delete
/// GET    /{id}/children              -> list_children
/// PUT    /{id}/move                  -> move_article
/// PUT    /{id}/aliases               -> update_aliases
/// GET    /{id}/summary               -> get_summary
/// DELETE /{id}/summary               -> clear_summary
/// GET    /{id}/backlinks             -> link::backlinks
/// GET    /{id}/outgoing-links        -> link::outgoing
/// POST   /{id}/auto-link             -> link::auto_link
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(article::list_roots).post(article::create))
        .route("/all", get(article::list_all))
        .route("/by-path/{*path}", get(article::get_by_path))
        .route("/resolve-links", post(link::resolve))
        .route(
            "/{id}",
            get(article::get_by_id)
                .put(article::update)
                .delete(article::delete),
        )
        .route("/{id}/children", get(article::list_children))
        .route("/{id}/move", put(article::move_article))
        .route("/{id}/aliases", put(article::update_aliases))
        .route(
            "/{id}/summary",
            get(article::get_summary).delete(article::clear_summary),
        )
        .route("/{id}/backlinks", get(link::backlinks))
        .route("/{id}/outgoing-links", get(link::outgoing))
        .route("/{id}/auto-link", post(link::auto_link))
}
