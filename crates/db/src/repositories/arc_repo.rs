//! Repository for the `arcs` table.

use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::campaign::{ArcWithCounts, CreateArc, StoryArc, UpdateArc};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, campaign_id, name, description, private_notes, sort_order, is_active, \
                       created_by, created_at, updated_at";

/// Provides CRUD operations for arcs.
pub struct ArcRepo;

impl ArcRepo {
    /// Insert a new arc. A zero or absent `sort_order` appends after the last arc.
    pub async fn create(
        pool: &PgPool,
        campaign_id: DbId,
        created_by: DbId,
        input: &CreateArc,
    ) -> Result<StoryArc, sqlx::Error> {
        let query = format!(
            "INSERT INTO arcs (campaign_id, name, description, private_notes, sort_order, created_by) \
             VALUES ($1, $2, $3, NULLIF(BTRIM($4), ''), \
                     CASE WHEN COALESCE($5, 0) = 0 \
                          THEN (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM arcs WHERE campaign_id = $1) \
                          ELSE $5 END, \
                     $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoryArc>(&query)
            .bind(campaign_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.private_notes)
            .bind(input.sort_order)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find an arc by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StoryArc>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM arcs WHERE id = $1");
        sqlx::query_as::<_, StoryArc>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Arcs of a campaign with session counts, by sort order then creation.
    pub async fn list_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<ArcWithCounts>, sqlx::Error> {
        sqlx::query_as::<_, ArcWithCounts>(
            "SELECT a.id, a.campaign_id, a.name, a.description, a.private_notes, a.sort_order, \
                    a.is_active, a.created_by, a.created_at, a.updated_at, \
                    (SELECT COUNT(*) FROM sessions s WHERE s.arc_id = a.id) AS session_count \
             FROM arcs a \
             WHERE a.campaign_id = $1 \
             ORDER BY a.sort_order, a.created_at",
        )
        .bind(campaign_id)
        .fetch_all(pool)
        .await
    }

    /// Apply a partial update. Blank text fields are cleared.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateArc,
    ) -> Result<Option<StoryArc>, sqlx::Error> {
        let query = format!(
            "UPDATE arcs SET \
                name = COALESCE($2, name), \
                description = CASE WHEN $3::TEXT IS NULL THEN description \
                                   ELSE NULLIF(BTRIM($3), '') END, \
                private_notes = CASE WHEN $4::TEXT IS NULL THEN private_notes \
                                     ELSE NULLIF(BTRIM($4), '') END, \
                sort_order = COALESCE($5, sort_order) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoryArc>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.private_notes)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Number of sessions in an arc.
    pub async fn session_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE arc_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Delete an arc. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM arcs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Make this the campaign's only active arc.
    pub async fn activate(pool: &PgPool, id: DbId) -> Result<Option<StoryArc>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE arcs SET is_active = FALSE \
             WHERE campaign_id = (SELECT campaign_id FROM arcs WHERE id = $1) \
               AND id <> $1 AND is_active",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!("UPDATE arcs SET is_active = TRUE WHERE id = $1 RETURNING {COLUMNS}");
        let arc = sqlx::query_as::<_, StoryArc>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(arc)
    }

    /// The campaign's active arc, or the last one by sort order.
    pub async fn current_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Option<StoryArc>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM arcs WHERE campaign_id = $1 \
             ORDER BY is_active DESC, sort_order DESC, created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, StoryArc>(&query)
            .bind(campaign_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve an arc's campaign and world in one query.
    pub async fn world_of(pool: &PgPool, id: DbId) -> Result<Option<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT c.world_id, c.id FROM arcs a JOIN campaigns c ON c.id = a.campaign_id \
             WHERE a.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
