//! Route definitions for character claims.

use axum::routing::get;
use axum::Router;

use crate::handlers::character;
use crate::state::AppState;

/// Routes mounted at `/characters`.
///
/// ```text
/// GET    /claimed       -> list_claimed
/// GET    /{id}/claim    -> claim_status
/// POST   /{id}/claim    -> claim
/// DELETE /{id}/claim    -> unclaim
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/claimed", get(character::list_claimed))
        .route(
            "/{id}/claim",
            get(character::claim_status)
                .post(character::claim)
                .delete(character::unclaim),
        )
}
