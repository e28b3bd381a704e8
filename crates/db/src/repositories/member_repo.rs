//! Repository for the `world_members` table.

use chronicis_core::kinds::WorldRole;
use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::member::{MemberWithUser, WorldMember};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, world_id, user_id, role, joined_at, invited_by, created_at, updated_at";

/// Provides membership lookups and role changes.
pub struct MemberRepo;

impl MemberRepo {
    /// The membership of `user_id` in `world_id`, if any.
    pub async fn find(
        pool: &PgPool,
        world_id: DbId,
        user_id: DbId,
    ) -> Result<Option<WorldMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM world_members WHERE world_id = $1 AND user_id = $2");
        sqlx::query_as::<_, WorldMember>(&query)
            .bind(world_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a membership row by its own ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WorldMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM world_members WHERE id = $1");
        sqlx::query_as::<_, WorldMember>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Members of a world with their profiles, GMs first then by join date.
    pub async fn list(pool: &PgPool, world_id: DbId) -> Result<Vec<MemberWithUser>, sqlx::Error> {
        sqlx::query_as::<_, MemberWithUser>(
            "SELECT m.id, m.world_id, m.user_id, u.display_name, u.email, u.avatar_url, \
                    m.role, m.joined_at, m.invited_by \
             FROM world_members m \
             JOIN users u ON u.id = m.user_id \
             WHERE m.world_id = $1 \
             ORDER BY (m.role = 'gm') DESC, m.joined_at",
        )
        .bind(world_id)
        .fetch_all(pool)
        .await
    }

    /// IDs of every world the user belongs to.
    pub async fn world_ids_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> =
            sqlx::query_as("SELECT world_id FROM world_members WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Number of GMs in a world.
    pub async fn count_gms(pool: &PgPool, world_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM world_members WHERE world_id = $1 AND role = 'gm'",
        )
        .bind(world_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Change a member's role. Returns `None` if the membership is gone.
    pub async fn update_role(
        pool: &PgPool,
        id: DbId,
        role: WorldRole,
    ) -> Result<Option<WorldMember>, sqlx::Error> {
        let query = format!("UPDATE world_members SET role = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, WorldMember>(&query)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Remove a membership. Returns `true` if a row was removed.
    pub async fn remove(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM world_members WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
