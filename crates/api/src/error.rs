//! HTTP error type and its JSON rendering.
//!
//! Every failure leaves the API as `{ "error": "...", "code": "..." }`; a
//! stale optimistic-concurrency write also carries `current`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chronicis_core::error::CoreError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// Someone else saved first. `current` is the entity as it is now.
    #[error("Stale version: {message}")]
    StaleVersion {
        message: String,
        current: serde_json::Value,
    },
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<serde_json::Value>,
}

/// Status, code and client-facing message for one error.
struct Rendered {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Rendered {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut current = None;
        let rendered = match self {
            AppError::Core(core) => render_core(core),
            AppError::Database(err) => render_sqlx(&err),
            AppError::BadRequest(msg) => Rendered::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Rendered::internal()
            }
            AppError::StaleVersion { message, current: latest } => {
                current = Some(latest);
                Rendered::new(StatusCode::CONFLICT, "CONFLICT", message)
            }
        };

        let body = ErrorBody {
            error: rendered.message,
            code: rendered.code,
            current,
        };
        (rendered.status, Json(body)).into_response()
    }
}

fn render_core(err: CoreError) -> Rendered {
    match err {
        CoreError::NotFound { entity, id } => Rendered::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::NotFoundByKey { entity, key } => Rendered::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} '{key}' not found"),
        ),
        CoreError::Validation(msg) => Rendered::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::Conflict(msg) => Rendered::new(StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Unauthorized(msg) => Rendered::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Forbidden(msg) => Rendered::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            Rendered::internal()
        }
    }
}

/// Map a sqlx failure onto the API's error codes.
///
/// Handlers check uniqueness up front; a `uq_` violation here means a
/// concurrent writer won the race, so it surfaces as a conflict.
fn render_sqlx(err: &sqlx::Error) -> Rendered {
    match err {
        sqlx::Error::RowNotFound => Rendered::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found"),
        sqlx::Error::Database(db_err) => {
            match (db_err.code().as_deref(), db_err.constraint()) {
                (Some("23505"), Some(constraint)) if constraint.starts_with("uq_") => {
                    Rendered::new(StatusCode::CONFLICT, "CONFLICT", conflict_message(constraint))
                }
                (Some("23503"), _) => Rendered::new(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "A referenced record does not exist",
                ),
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    Rendered::internal()
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            Rendered::internal()
        }
    }
}

fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_articles_location_slug" => "An article with this slug already exists in this location".into(),
        "uq_worlds_owner_slug" => "You already own a world with this slug".into(),
        "uq_worlds_public_slug" => "This public slug is already in use".into(),
        "uq_world_members_world_user" => "You are already a member of this world".into(),
        "uq_world_documents_world_title" => "A document with this title already exists".into(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}
