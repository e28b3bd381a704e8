//! Repository for the `quests` and `quest_updates` tables.
//!
//! Quest edits use optimistic concurrency: the caller supplies the
//! `row_version` it last read and the update only applies if it still
//! matches.

use chronicis_core::kinds::QuestStatus;
use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::quest::{
    CreateQuest, CreateQuestUpdate, Quest, QuestUpdate, QuestUpdatePage, QuestWithStats,
    UpdateQuest,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, arc_id, title, description, status, is_gm_only, sort_order, row_version, \
                       created_by, created_at, updated_at";

const UPDATE_COLUMNS: &str = "qu.id, qu.quest_id, qu.session_id, qu.body, qu.created_by, \
                              u.display_name AS author_name, qu.created_at, qu.updated_at";

/// Result of a versioned quest update.
#[derive(Debug)]
pub enum QuestUpdateOutcome {
    Updated(Quest),
    /// Someone else changed the quest first; carries the current row.
    Stale(Quest),
    NotFound,
}

/// Provides CRUD operations for quests and their updates.
pub struct QuestRepo;

impl QuestRepo {
    // -----------------------------------------------------------------------
    // Quests
    // -----------------------------------------------------------------------

    /// Insert a new quest, returning the created row.
    pub async fn create(
        pool: &PgPool,
        arc_id: DbId,
        created_by: DbId,
        input: &CreateQuest,
    ) -> Result<Quest, sqlx::Error> {
        let query = format!(
            "INSERT INTO quests (arc_id, title, description, status, is_gm_only, sort_order, created_by) \
             VALUES ($1, $2, NULLIF(BTRIM($3), ''), $4, $5, COALESCE($6, 0), $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quest>(&query)
            .bind(arc_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status.unwrap_or(QuestStatus::Active).as_str())
            .bind(input.is_gm_only)
            .bind(input.sort_order)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a quest by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Quest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quests WHERE id = $1");
        sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Quests of an arc with update statistics.
    ///
    /// GM-only quests are included only when `include_gm_only` is set.
    /// Ordered by sort order, then most recently updated.
    pub async fn list_for_arc(
        pool: &PgPool,
        arc_id: DbId,
        include_gm_only: bool,
    ) -> Result<Vec<QuestWithStats>, sqlx::Error> {
        sqlx::query_as::<_, QuestWithStats>(
            "SELECT q.id, q.arc_id, q.title, q.description, q.status, q.is_gm_only, q.sort_order, \
                    q.row_version, q.created_by, q.created_at, q.updated_at, \
                    COUNT(qu.id) AS update_count, MAX(qu.created_at) AS last_update_at \
             FROM quests q \
             LEFT JOIN quest_updates qu ON qu.quest_id = q.id \
             WHERE q.arc_id = $1 AND ($2 OR NOT q.is_gm_only) \
             GROUP BY q.id \
             ORDER BY q.sort_order, q.updated_at DESC",
        )
        .bind(arc_id)
        .bind(include_gm_only)
        .fetch_all(pool)
        .await
    }

    /// Apply a partial update if `input.row_version` is still current.
    ///
    /// A blank `description` clears it. Each successful update increments
    /// `row_version`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateQuest,
    ) -> Result<QuestUpdateOutcome, sqlx::Error> {
        let query = format!(
            "UPDATE quests SET \
                title = COALESCE($3, title), \
                description = CASE WHEN $4::TEXT IS NULL THEN description \
                                   ELSE NULLIF(BTRIM($4), '') END, \
                status = COALESCE($5, status), \
                is_gm_only = COALESCE($6, is_gm_only), \
                sort_order = COALESCE($7, sort_order), \
                row_version = row_version + 1 \
             WHERE id = $1 AND row_version = $2 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .bind(input.row_version)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status.map(QuestStatus::as_str))
            .bind(input.is_gm_only)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await?;

        if let Some(quest) = updated {
            return Ok(QuestUpdateOutcome::Updated(quest));
        }
        Ok(match Self::find_by_id(pool, id).await? {
            Some(current) => QuestUpdateOutcome::Stale(current),
            None => QuestUpdateOutcome::NotFound,
        })
    }

    /// Delete a quest and its updates. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Quest updates
    // -----------------------------------------------------------------------

    /// One page of a quest's updates, newest first, with the total count.
    pub async fn list_updates(
        pool: &PgPool,
        quest_id: DbId,
        skip: i64,
        take: i64,
    ) -> Result<QuestUpdatePage, sqlx::Error> {
        let query = format!(
            "SELECT {UPDATE_COLUMNS} FROM quest_updates qu \
             JOIN users u ON u.id = qu.created_by \
             WHERE qu.quest_id = $1 \
             ORDER BY qu.created_at DESC, qu.id \
             OFFSET $2 LIMIT $3"
        );
        let items = sqlx::query_as::<_, QuestUpdate>(&query)
            .bind(quest_id)
            .bind(skip)
            .bind(take)
            .fetch_all(pool)
            .await?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM quest_updates WHERE quest_id = $1")
                .bind(quest_id)
                .fetch_one(pool)
                .await?;

        Ok(QuestUpdatePage {
            items,
            total,
            skip,
            take,
        })
    }

    /// Add an update and bump the quest's `updated_at` together.
    pub async fn create_update(
        pool: &PgPool,
        quest_id: DbId,
        created_by: DbId,
        input: &CreateQuestUpdate,
    ) -> Result<QuestUpdate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO quest_updates (quest_id, session_id, body, created_by) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(quest_id)
        .bind(input.session_id)
        .bind(&input.body)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE quests SET updated_at = NOW() WHERE id = $1")
            .bind(quest_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {UPDATE_COLUMNS} FROM quest_updates qu \
             JOIN users u ON u.id = qu.created_by WHERE qu.id = $1"
        );
        let update = sqlx::query_as::<_, QuestUpdate>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(update)
    }

    /// Find one update of a quest.
    pub async fn find_update(
        pool: &PgPool,
        quest_id: DbId,
        id: DbId,
    ) -> Result<Option<QuestUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {UPDATE_COLUMNS} FROM quest_updates qu \
             JOIN users u ON u.id = qu.created_by \
             WHERE qu.id = $1 AND qu.quest_id = $2"
        );
        sqlx::query_as::<_, QuestUpdate>(&query)
            .bind(id)
            .bind(quest_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an update. Returns `true` if a row was removed.
    pub async fn delete_update(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quest_updates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
