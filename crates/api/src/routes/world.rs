//! Route definitions for the `/worlds` resource and everything scoped to a
//! world (members, invitations, campaigns, links, documents).

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use chronicis_core::documents::MAX_DOCUMENT_SIZE_BYTES;

use crate::handlers::{
    campaign, document, hashtag, invitation, link, member, world, world_link,
};
use crate::state::AppState;

/// Routes mounted at `/worlds`.
///
/// ```text
/// GET    /                                   -> list
/// POST   /                                   -> create
/// POST   /join                               -> invitation::join
/// GET    /{id}                               -> get_by_id
/// PUT    /{id}                               -> update
/// POST   /{id}/check-public-slug             -> check_public_slug
/// GET    /{id}/active-context                -> active_context
///
/// GET    /{id}/members                       -> member::list
/// PUT    /{id}/members/{member_id}           -> member::update_role
/// DELETE /{id}/members/{member_id}           -> member::remove
///
/// GET    /{id}/invitations                   -> invitation::list
/// POST   /{id}/invitations                   -> invitation::create
/// DELETE /{id}/invitations/{invitation_id}   -> invitation::revoke
///
/// GET    /{id}/campaigns                     -> campaign::list_by_world
/// POST   /{id}/campaigns                     -> campaign::create
///
/// GET    /{id}/links                         -> world_link::list_by_world
/// POST   /{id}/links                         -> world_link::create
/// PUT    /{id}/links/{link_id}               -> world_link::update
/// DELETE /{id}/links/{link_id}               -> world_link::delete
///
/// GET    /{id}/documents                     -> document::list_by_world
/// POST   /{id}/documents/request-upload      -> document::request_upload
/// PUT    /{id}/documents/{doc}               -> document::update
/// DELETE /{id}/documents/{doc}               -> document::delete
/// PUT    /{id}/documents/{doc}/content       -> document::upload_content
/// GET    /{id}/documents/{doc}/content       -> document::download
/// POST   /{id}/documents/{doc}/confirm       -> document::confirm_upload
///
/// GET    /{id}/hashtags                      -> hashtag::list_by_world
/// GET    /{id}/link-suggestions              -> link::suggestions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(world::list).post(world::create))
        .route("/join", post(invitation::join))
        .route("/{id}", get(world::get_by_id).put(world::update))
        .route("/{id}/check-public-slug", post(world::check_public_slug))
        .route("/{id}/active-context", get(world::active_context))
        // Membership.
        .route("/{id}/members", get(member::list))
        .route(
            "/{id}/members/{member_id}",
            put(member::update_role).delete(member::remove),
        )
        .route(
            "/{id}/invitations",
            get(invitation::list).post(invitation::create),
        )
        .route(
            "/{id}/invitations/{invitation_id}",
            delete(invitation::revoke),
        )
        // Campaigns.
        .route(
            "/{id}/campaigns",
            get(campaign::list_by_world).post(campaign::create),
        )
        // External links.
        .route(
            "/{id}/links",
            get(world_link::list_by_world).post(world_link::create),
        )
        .route(
            "/{id}/links/{link_id}",
            put(world_link::update).delete(world_link::delete),
        )
        // Documents.
        .route("/{id}/documents", get(document::list_by_world))
        .route(
            "/{id}/documents/request-upload",
            post(document::request_upload),
        )
        .route(
            "/{id}/documents/{doc}",
            put(document::update).delete(document::delete),
        )
        .route(
            "/{id}/documents/{doc}/content",
            get(document::download).put(document::upload_content).layer(
                DefaultBodyLimit::max(MAX_DOCUMENT_SIZE_BYTES as usize),
            ),
        )
        .route(
            "/{id}/documents/{doc}/confirm",
            post(document::confirm_upload),
        )
        // Wiki helpers.
        .route("/{id}/hashtags", get(hashtag::list_by_world))
        .route("/{id}/link-suggestions", get(link::suggestions))
}
