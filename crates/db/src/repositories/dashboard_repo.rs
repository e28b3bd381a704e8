//! Aggregate queries behind the dashboard.

use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{DashboardCampaignRow, DashboardWorldRow};

/// Provides dashboard aggregates.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Worlds the user belongs to with their article counts, by name.
    pub async fn worlds(pool: &PgPool, user_id: DbId) -> Result<Vec<DashboardWorldRow>, sqlx::Error> {
        sqlx::query_as::<_, DashboardWorldRow>(
            "SELECT w.id, w.name, w.slug, w.description, m.role, \
                    (SELECT COUNT(*) FROM articles a WHERE a.world_id = w.id) AS article_count \
             FROM worlds w \
             JOIN world_members m ON m.world_id = w.id AND m.user_id = $1 \
             ORDER BY w.name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Campaigns of the given worlds with arc/session counts and the current arc.
    ///
    /// The current arc is the active one, or the last by sort order.
    pub async fn campaigns(
        pool: &PgPool,
        world_ids: &[DbId],
    ) -> Result<Vec<DashboardCampaignRow>, sqlx::Error> {
        sqlx::query_as::<_, DashboardCampaignRow>(
            "SELECT c.id, c.world_id, c.name, c.is_active, \
                    (SELECT COUNT(*) FROM arcs a WHERE a.campaign_id = c.id) AS arc_count, \
                    (SELECT COUNT(*) FROM sessions s JOIN arcs a ON a.id = s.arc_id \
                      WHERE a.campaign_id = c.id) AS session_count, \
                    ca.id AS current_arc_id, ca.name AS current_arc_name, \
                    (SELECT MAX(s.session_date) FROM sessions s WHERE s.arc_id = ca.id) \
                        AS latest_session_date \
             FROM campaigns c \
             LEFT JOIN LATERAL ( \
                 SELECT id, name FROM arcs WHERE campaign_id = c.id \
                 ORDER BY is_active DESC, sort_order DESC, created_at DESC \
                 LIMIT 1 \
             ) ca ON TRUE \
             WHERE c.world_id = ANY($1) \
             ORDER BY c.is_active DESC, c.created_at",
        )
        .bind(world_ids)
        .fetch_all(pool)
        .await
    }

    /// Whether the user has written any session notes.
    pub async fn has_session_notes(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM articles \
                            WHERE created_by = $1 AND article_type = 'session_note' \
                              AND COALESCE(BTRIM(body), '') <> '')",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}
