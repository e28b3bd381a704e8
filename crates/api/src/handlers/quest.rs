//! Handlers for quests and their running updates.
//!
//! Quest edits use optimistic concurrency: clients echo the `row_version`
//! they last saw and receive the current quest back on a mismatch.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::error::CoreError;
use chronicis_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use chronicis_core::types::DbId;
use chronicis_core::validation::{normalize_optional, require_text, MAX_QUEST_TITLE_LENGTH};
use chronicis_db::models::quest::{CreateQuest, CreateQuestUpdate, UpdateQuest};
use chronicis_db::repositories::{QuestRepo, QuestUpdateOutcome, SessionRepo};

use crate::access::{arc_access, quest_access};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::SkipTakeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Quests
-------------------------------------------------------------------------- */

/// GET /api/v1/arcs/{id}/quests
///
/// GM-only quests are left out for players and observers.
pub async fn list_by_arc(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(arc_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = arc_access(&state.pool, arc_id, auth.user_id).await?;
    let quests = QuestRepo::list_for_arc(&state.pool, arc_id, access.is_gm()).await?;
    Ok(Json(DataResponse { data: quests }))
}

/// POST /api/v1/arcs/{id}/quests
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(arc_id): Path<DbId>,
    Json(input): Json<CreateQuest>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = arc_access(&state.pool, arc_id, auth.user_id).await?;
    access.require_gm()?;

    let input = CreateQuest {
        title: require_text("Quest title", &input.title, MAX_QUEST_TITLE_LENGTH)?,
        description: normalize_optional(input.description.as_deref()),
        ..input
    };
    let quest = QuestRepo::create(&state.pool, arc_id, auth.user_id, &input).await?;

    tracing::info!(
        user_id = %auth.user_id,
        arc_id = %arc_id,
        quest_id = %quest.id,
        "Quest created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: quest })))
}

/// GET /api/v1/quests/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (quest, _) = quest_access(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: quest }))
}

/// PUT /api/v1/quests/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateQuest>,
) -> AppResult<impl IntoResponse> {
    let (_, access) = quest_access(&state.pool, id, auth.user_id).await?;
    access.require_gm()?;

    let input = UpdateQuest {
        title: input
            .title
            .as_deref()
            .map(|t| require_text("Quest title", t, MAX_QUEST_TITLE_LENGTH))
            .transpose()?,
        ..input
    };

    match QuestRepo::update(&state.pool, id, &input).await? {
        QuestUpdateOutcome::Updated(quest) => {
            tracing::info!(
                user_id = %auth.user_id,
                quest_id = %id,
                row_version = quest.row_version,
                "Quest updated"
            );
            Ok(Json(DataResponse { data: quest }))
        }
        QuestUpdateOutcome::Stale(current) => {
            tracing::warn!(
                user_id = %auth.user_id,
                quest_id = %id,
                sent = input.row_version,
                current = current.row_version,
                "Stale quest update rejected"
            );
            let current = serde_json::to_value(&current)
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            Err(AppError::StaleVersion {
                message: "Quest was modified by someone else. Reload and try again.".into(),
                current,
            })
        }
        QuestUpdateOutcome::NotFound => Err(CoreError::not_found("Quest", id).into()),
    }
}

/// DELETE /api/v1/quests/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let (_, access) = quest_access(&state.pool, id, auth.user_id).await?;
    access.require_gm()?;

    if !QuestRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Quest", id).into());
    }

    tracing::info!(user_id = %auth.user_id, quest_id = %id, "Quest deleted");
    Ok(StatusCode::NO_CONTENT)
}

/* --------------------------------------------------------------------------
Quest updates
-------------------------------------------------------------------------- */

/// GET /api/v1/quests/{id}/updates?skip=&take=
pub async fn list_updates(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<SkipTakeParams>,
) -> AppResult<impl IntoResponse> {
    quest_access(&state.pool, id, auth.user_id).await?;
    let skip = clamp_offset(params.skip);
    let take = clamp_limit(params.take, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let page = QuestRepo::list_updates(&state.pool, id, skip, take).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/quests/{id}/updates
pub async fn create_update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateQuestUpdate>,
) -> AppResult<impl IntoResponse> {
    let (quest, access) = quest_access(&state.pool, id, auth.user_id).await?;
    access.require_writer()?;

    let body = input.body.trim();
    if body.is_empty() {
        return Err(CoreError::Validation("Update body is required".into()).into());
    }

    if let Some(session_id) = input.session_id {
        let session = SessionRepo::find_by_id(&state.pool, session_id).await?;
        if session.map(|s| s.arc_id) != Some(quest.arc_id) {
            return Err(CoreError::Validation(
                "Session must belong to the quest's arc".into(),
            )
            .into());
        }
    }

    let input = CreateQuestUpdate {
        body: body.to_string(),
        session_id: input.session_id,
    };
    let update = QuestRepo::create_update(&state.pool, id, auth.user_id, &input).await?;

    tracing::info!(
        user_id = %auth.user_id,
        quest_id = %id,
        update_id = %update.id,
        "Quest update added"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: update })))
}

/// DELETE /api/v1/quests/{id}/updates/{update_id}
///
/// GMs may remove any update; others only their own.
pub async fn delete_update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, update_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let (_, access) = quest_access(&state.pool, id, auth.user_id).await?;
    let update = QuestRepo::find_update(&state.pool, id, update_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Quest update", update_id))?;

    if !access.is_gm() && update.created_by != auth.user_id {
        return Err(CoreError::Forbidden(
            "Only a GM or the author can delete this update".into(),
        )
        .into());
    }
    QuestRepo::delete_update(&state.pool, update_id).await?;

    tracing::info!(
        user_id = %auth.user_id,
        quest_id = %id,
        update_id = %update_id,
        "Quest update deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
