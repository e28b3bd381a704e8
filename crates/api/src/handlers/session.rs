//! Handlers for play sessions within an arc.
//!
//! Creating a session also creates the GM's root notes article for it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::kinds::{ArticleType, ArticleVisibility};
use chronicis_core::slug::{generate_slug, unique_slug};
use chronicis_core::types::DbId;
use chronicis_core::validation::{require_text, MAX_SESSION_NAME_LENGTH};
use chronicis_db::models::article::NewArticle;
use chronicis_db::models::campaign::{CreateSession, Session, UpdateSessionNotes};
use chronicis_db::repositories::{ArcRepo, ArticleRepo, SessionRepo};

use crate::access::{arc_access, session_access, WorldAccess};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Hide private notes from non-GMs.
fn redact_session(mut session: Session, access: &WorldAccess) -> Session {
    if !access.is_gm() {
        session.private_notes = None;
    }
    session
}

/// Title of the notes article created with a session.
pub fn notes_title(display_name: &str) -> String {
    let name = display_name.trim();
    if name.is_empty() {
        "My Notes".to_string()
    } else {
        format!("{name}'s Notes")
    }
}

/// GET /api/v1/arcs/{id}/sessions
pub async fn list_by_arc(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(arc_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = arc_access(&state.pool, arc_id, auth.user_id).await?;
    let sessions: Vec<Session> = SessionRepo::list_for_arc(&state.pool, arc_id)
        .await?
        .into_iter()
        .map(|s| redact_session(s, &access))
        .collect();
    Ok(Json(DataResponse { data: sessions }))
}

/// POST /api/v1/arcs/{id}/sessions
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(arc_id): Path<DbId>,
    Json(input): Json<CreateSession>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = arc_access(&state.pool, arc_id, auth.user_id).await?;
    access.require_gm()?;

    let (world_id, campaign_id) = ArcRepo::world_of(&state.pool, arc_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Arc", arc_id))?;

    let input = CreateSession {
        name: require_text("Session name", &input.name, MAX_SESSION_NAME_LENGTH)?,
        ..input
    };

    let title = notes_title(&auth.display_name);
    let taken = ArticleRepo::sibling_slugs(&state.pool, Some(world_id), None, None).await?;
    let note = NewArticle {
        world_id: Some(world_id),
        parent_id: None,
        campaign_id: Some(campaign_id),
        arc_id: Some(arc_id),
        session_id: None,
        slug: unique_slug(&generate_slug(&title), &taken),
        title,
        body: None,
        article_type: ArticleType::SessionNote,
        visibility: ArticleVisibility::MembersOnly,
        icon_emoji: None,
        effective_date: input.session_date.unwrap_or_else(chrono::Utc::now),
        in_game_date: None,
        player_id: None,
        created_by: auth.user_id,
    };

    let session =
        SessionRepo::create_with_note(&state.pool, arc_id, auth.user_id, &input, &note).await?;

    tracing::info!(
        user_id = %auth.user_id,
        world_id = %world_id,
        arc_id = %arc_id,
        session_id = %session.id,
        "Session created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /api/v1/sessions/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (session, _, access) = session_access(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: redact_session(session, &access),
    }))
}

/// PATCH /api/v1/sessions/{id}
pub async fn update_notes(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSessionNotes>,
) -> AppResult<impl IntoResponse> {
    let (_, _, access) = session_access(&state.pool, id, auth.user_id).await?;
    access.require_gm()?;

    let input = UpdateSessionNotes {
        name: input
            .name
            .as_deref()
            .map(|n| require_text("Session name", n, MAX_SESSION_NAME_LENGTH))
            .transpose()?,
        ..input
    };
    let session = SessionRepo::update_notes(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Session", id))?;

    tracing::info!(user_id = %auth.user_id, session_id = %id, "Session notes updated");
    Ok(Json(DataResponse { data: session }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_title_uses_display_name() {
        assert_eq!(notes_title("Vex"), "Vex's Notes");
        assert_eq!(notes_title("  "), "My Notes");
    }
}
