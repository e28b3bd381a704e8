//! Repository for the `world_documents` table.

use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{NewWorldDocument, UpdateWorldDocument, WorldDocument};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, world_id, file_name, title, content_type, file_size_bytes, description, \
                       blob_path, is_uploaded, uploaded_by, uploaded_at, created_at, updated_at";

/// Provides CRUD operations for world documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a pending document record.
    pub async fn create(pool: &PgPool, input: &NewWorldDocument) -> Result<WorldDocument, sqlx::Error> {
        let query = format!(
            "INSERT INTO world_documents (id, world_id, file_name, title, content_type, \
                                          file_size_bytes, description, blob_path, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6, NULLIF(BTRIM($7), ''), $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorldDocument>(&query)
            .bind(input.id)
            .bind(input.world_id)
            .bind(&input.file_name)
            .bind(&input.title)
            .bind(&input.content_type)
            .bind(input.file_size_bytes)
            .bind(&input.description)
            .bind(&input.blob_path)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    /// Find a document belonging to `world_id`.
    pub async fn find(
        pool: &PgPool,
        world_id: DbId,
        id: DbId,
    ) -> Result<Option<WorldDocument>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM world_documents WHERE id = $1 AND world_id = $2");
        sqlx::query_as::<_, WorldDocument>(&query)
            .bind(id)
            .bind(world_id)
            .fetch_optional(pool)
            .await
    }

    /// Documents of a world, newest first.
    pub async fn list_for_world(pool: &PgPool, world_id: DbId) -> Result<Vec<WorldDocument>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM world_documents WHERE world_id = $1 ORDER BY uploaded_at DESC"
        );
        sqlx::query_as::<_, WorldDocument>(&query)
            .bind(world_id)
            .fetch_all(pool)
            .await
    }

    /// Titles in a world starting with `prefix`, for duplicate numbering.
    pub async fn titles_with_prefix(
        pool: &PgPool,
        world_id: DbId,
        prefix: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT title FROM world_documents WHERE world_id = $1 AND starts_with(title, $2)",
        )
        .bind(world_id)
        .bind(prefix)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    /// Record the stored size and mark the upload complete.
    pub async fn mark_uploaded(
        pool: &PgPool,
        id: DbId,
        file_size_bytes: i64,
    ) -> Result<Option<WorldDocument>, sqlx::Error> {
        let query = format!(
            "UPDATE world_documents SET is_uploaded = TRUE, file_size_bytes = $2, uploaded_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorldDocument>(&query)
            .bind(id)
            .bind(file_size_bytes)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update. A blank `description` clears it.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorldDocument,
    ) -> Result<Option<WorldDocument>, sqlx::Error> {
        let query = format!(
            "UPDATE world_documents SET \
                title = COALESCE($2, title), \
                description = CASE WHEN $3::TEXT IS NULL THEN description \
                                   ELSE NULLIF(BTRIM($3), '') END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorldDocument>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a document record. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM world_documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
