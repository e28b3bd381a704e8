//! Handlers for world documents.
//!
//! Uploading is two-phase: the owner requests an upload (which creates a
//! pending record and returns the content URL), sends the bytes, then
//! confirms. Bytes live in the [`crate::storage::BlobStore`].

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chronicis_core::documents::{
    blob_path, file_stem, sanitize_file_name, unique_title, validate_upload,
    MAX_DOCUMENT_SIZE_BYTES,
};
use chronicis_core::error::CoreError;
use chronicis_core::types::DbId;
use chronicis_core::validation::{normalize_optional, require_text, MAX_ARTICLE_TITLE_LENGTH};
use chronicis_db::models::document::{
    NewWorldDocument, RequestUpload, UpdateWorldDocument, UploadTicket, WorldDocument,
};
use chronicis_db::repositories::DocumentRepo;
use sqlx::PgPool;

use crate::access::world_access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

async fn find_document(pool: &PgPool, world_id: DbId, id: DbId) -> AppResult<WorldDocument> {
    DocumentRepo::find(pool, world_id, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Document", id).into())
}

/// Where the client sends a document's bytes.
pub fn content_url(world_id: DbId, document_id: DbId) -> String {
    format!("/api/v1/worlds/{world_id}/documents/{document_id}/content")
}

/// `Content-Disposition` value safe for any stored file name.
fn attachment_header(file_name: &str) -> String {
    let ascii: String = sanitize_file_name(file_name)
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect();
    format!("attachment; filename=\"{ascii}\"")
}

/// GET /api/v1/worlds/{id}/documents
pub async fn list_by_world(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id).await?;
    let documents = DocumentRepo::list_for_world(&state.pool, world_id).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// POST /api/v1/worlds/{id}/documents/request-upload
pub async fn request_upload(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(world_id): Path<DbId>,
    Json(input): Json<RequestUpload>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_owner()?;

    let upload = validate_upload(
        &input.file_name,
        input.file_size_bytes,
        input.content_type.as_deref(),
    )?;
    if upload.content_type_mismatch {
        tracing::warn!(
            world_id = %world_id,
            file_name = %upload.file_name,
            declared = ?input.content_type,
            stored = upload.content_type,
            "Declared content type differs from extension; using canonical type"
        );
    }

    let existing =
        DocumentRepo::titles_with_prefix(&state.pool, world_id, file_stem(&upload.file_name)).await?;
    let title = unique_title(&upload.file_name, &existing)?;

    let id = DbId::new_v4();
    let document = DocumentRepo::create(
        &state.pool,
        &NewWorldDocument {
            id,
            world_id,
            blob_path: blob_path(world_id, id, &upload.file_name),
            file_name: upload.file_name,
            title,
            content_type: upload.content_type.to_string(),
            file_size_bytes: input.file_size_bytes,
            description: normalize_optional(input.description.as_deref()),
            uploaded_by: auth.user_id,
        },
    )
    .await?;

    tracing::info!(
        user_id = %auth.user_id,
        world_id = %world_id,
        document_id = %document.id,
        "Document upload requested"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadTicket {
                document_id: document.id,
                upload_url: content_url(world_id, document.id),
                title: document.title,
            },
        }),
    ))
}

/// PUT /api/v1/worlds/{id}/documents/{doc}/content
pub async fn upload_content(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, id)): Path<(DbId, DbId)>,
    bytes: Bytes,
) -> AppResult<StatusCode> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_owner()?;
    let document = find_document(&state.pool, world_id, id).await?;

    if bytes.is_empty() {
        return Err(CoreError::Validation("File content is empty".into()).into());
    }
    if bytes.len() as i64 > MAX_DOCUMENT_SIZE_BYTES {
        return Err(CoreError::Validation("File content exceeds the maximum size".into()).into());
    }

    state.blob_store.put(&document.blob_path, &bytes).await?;

    tracing::info!(
        user_id = %auth.user_id,
        world_id = %world_id,
        document_id = %id,
        size = bytes.len(),
        "Document content stored"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/worlds/{id}/documents/{doc}/confirm
///
/// Records the stored size and marks the document as uploaded.
pub async fn confirm_upload(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_owner()?;
    let document = find_document(&state.pool, world_id, id).await?;

    let size = state
        .blob_store
        .size(&document.blob_path)
        .await?
        .ok_or_else(|| CoreError::Validation("File has not been uploaded".into()))?;
    let size = i64::try_from(size)
        .map_err(|_| CoreError::Validation("File content exceeds the maximum size".into()))?;

    let document = DocumentRepo::mark_uploaded(&state.pool, id, size)
        .await?
        .ok_or_else(|| CoreError::not_found("Document", id))?;

    tracing::info!(
        user_id = %auth.user_id,
        world_id = %world_id,
        document_id = %id,
        size,
        "Document upload confirmed"
    );
    Ok(Json(DataResponse { data: document }))
}

/// GET /api/v1/worlds/{id}/documents/{doc}/content
pub async fn download(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id).await?;
    let document = find_document(&state.pool, world_id, id).await?;
    if !document.is_uploaded {
        return Err(CoreError::not_found("Document", id).into());
    }

    let bytes = state.blob_store.get(&document.blob_path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type),
            (
                header::CONTENT_DISPOSITION,
                attachment_header(&document.file_name),
            ),
        ],
        bytes,
    ))
}

/// PUT /api/v1/worlds/{id}/documents/{doc}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateWorldDocument>,
) -> AppResult<impl IntoResponse> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_owner()?;
    find_document(&state.pool, world_id, id).await?;

    let input = UpdateWorldDocument {
        title: input
            .title
            .as_deref()
            .map(|t| require_text("Title", t, MAX_ARTICLE_TITLE_LENGTH))
            .transpose()?,
        description: input.description,
    };
    let document = DocumentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Document", id))?;

    tracing::info!(user_id = %auth.user_id, world_id = %world_id, document_id = %id, "Document updated");
    Ok(Json(DataResponse { data: document }))
}

/// DELETE /api/v1/worlds/{id}/documents/{doc}
///
/// The record goes first; a blob that cannot be removed is only logged.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((world_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    world_access(&state.pool, world_id, auth.user_id)
        .await?
        .require_owner()?;
    let document = find_document(&state.pool, world_id, id).await?;

    DocumentRepo::delete(&state.pool, id).await?;
    if let Err(e) = state.blob_store.delete(&document.blob_path).await {
        tracing::warn!(
            world_id = %world_id,
            document_id = %id,
            error = %e,
            "Failed to delete document blob"
        );
    }

    tracing::info!(user_id = %auth.user_id, world_id = %world_id, document_id = %id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
