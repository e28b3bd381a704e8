//! Repository for the `sessions` table.

use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::NewArticle;
use crate::models::campaign::{CreateSession, Session, UpdateSessionNotes};
use crate::repositories::ArticleRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, arc_id, name, session_date, public_notes, private_notes, created_by, \
                       created_at, updated_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a session and its creator's root notes article together.
    ///
    /// `note.session_id` is overwritten with the new session's ID.
    pub async fn create_with_note(
        pool: &PgPool,
        arc_id: DbId,
        created_by: DbId,
        input: &CreateSession,
        note: &NewArticle,
    ) -> Result<Session, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO sessions (arc_id, name, session_date, public_notes, private_notes, created_by) \
             VALUES ($1, $2, $3, NULLIF(BTRIM($4), ''), NULLIF(BTRIM($5), ''), $6) \
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, Session>(&query)
            .bind(arc_id)
            .bind(&input.name)
            .bind(input.session_date)
            .bind(&input.public_notes)
            .bind(&input.private_notes)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        let note = NewArticle {
            session_id: Some(session.id),
            ..note.clone()
        };
        ArticleRepo::insert_tx(&mut tx, &note).await?;

        tx.commit().await?;
        Ok(session)
    }

    /// Find a session by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Sessions of an arc by date (undated last), then name.
    pub async fn list_for_arc(pool: &PgPool, arc_id: DbId) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions WHERE arc_id = $1 \
             ORDER BY session_date NULLS LAST, name"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(arc_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Blank notes are cleared.
    pub async fn update_notes(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSessionNotes,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET \
                name = COALESCE($2, name), \
                session_date = COALESCE($3, session_date), \
                public_notes = CASE WHEN $4::TEXT IS NULL THEN public_notes \
                                    ELSE NULLIF(BTRIM($4), '') END, \
                private_notes = CASE WHEN $5::TEXT IS NULL THEN private_notes \
                                     ELSE NULLIF(BTRIM($5), '') END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.session_date)
            .bind(&input.public_notes)
            .bind(&input.private_notes)
            .fetch_optional(pool)
            .await
    }

    /// `(arc_id, campaign_id, world_id)` of a session.
    pub async fn context(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<(DbId, DbId, DbId)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT s.arc_id, c.id, c.world_id \
             FROM sessions s \
             JOIN arcs a ON a.id = s.arc_id \
             JOIN campaigns c ON c.id = a.campaign_id \
             WHERE s.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
