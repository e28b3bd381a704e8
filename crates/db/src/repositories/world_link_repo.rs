//! Repository for the `world_links` table.

use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::world_link::{WorldLink, WorldLinkInput};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, world_id, url, title, description, created_at, updated_at";

/// Provides CRUD operations for world links.
pub struct WorldLinkRepo;

impl WorldLinkRepo {
    /// Links of a world, by title.
    pub async fn list_for_world(pool: &PgPool, world_id: DbId) -> Result<Vec<WorldLink>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM world_links WHERE world_id = $1 ORDER BY title");
        sqlx::query_as::<_, WorldLink>(&query)
            .bind(world_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a link. `input` must already be validated.
    pub async fn create(
        pool: &PgPool,
        world_id: DbId,
        input: &WorldLinkInput,
    ) -> Result<WorldLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO world_links (world_id, url, title, description) \
             VALUES ($1, $2, $3, NULLIF(BTRIM($4), '')) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorldLink>(&query)
            .bind(world_id)
            .bind(&input.url)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Replace a link's fields. Returns `None` if it is not in the world.
    pub async fn update(
        pool: &PgPool,
        world_id: DbId,
        id: DbId,
        input: &WorldLinkInput,
    ) -> Result<Option<WorldLink>, sqlx::Error> {
        let query = format!(
            "UPDATE world_links SET url = $3, title = $4, description = NULLIF(BTRIM($5), '') \
             WHERE id = $1 AND world_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorldLink>(&query)
            .bind(id)
            .bind(world_id)
            .bind(&input.url)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a link. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, world_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM world_links WHERE id = $1 AND world_id = $2")
            .bind(id)
            .bind(world_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
