//! Files attached to a world.

use chronicis_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `world_documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorldDocument {
    pub id: DbId,
    pub world_id: DbId,
    pub file_name: String,
    pub title: String,
    pub content_type: String,
    pub file_size_bytes: i64,
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub blob_path: String,
    pub is_uploaded: bool,
    pub uploaded_by: DbId,
    pub uploaded_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /worlds/{id}/documents/request-upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub file_size_bytes: i64,
    pub description: Option<String>,
}

/// Validated insert for a pending document.
#[derive(Debug, Clone)]
pub struct NewWorldDocument {
    pub id: DbId,
    pub world_id: DbId,
    pub file_name: String,
    pub title: String,
    pub content_type: String,
    pub file_size_bytes: i64,
    pub description: Option<String>,
    pub blob_path: String,
    pub uploaded_by: DbId,
}

/// Request body for `PUT /worlds/{id}/documents/{doc}`. Blank description clears it.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorldDocument {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Response to an upload request.
#[derive(Debug, Clone, Serialize)]
pub struct UploadTicket {
    pub document_id: DbId,
    pub upload_url: String,
    pub title: String,
}
