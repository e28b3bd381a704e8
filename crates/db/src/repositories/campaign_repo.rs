//! Repository for the `campaigns` table.

use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::campaign::{Campaign, CreateCampaign, UpdateCampaign};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, world_id, name, description, is_active, created_by, created_at, updated_at";

/// Provides CRUD operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a new campaign, returning the created row.
    pub async fn create(
        pool: &PgPool,
        world_id: DbId,
        created_by: DbId,
        input: &CreateCampaign,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (world_id, name, description, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(world_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a campaign by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Campaigns of a world, oldest first.
    pub async fn list_for_world(pool: &PgPool, world_id: DbId) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns WHERE world_id = $1 ORDER BY created_at, name"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(world_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. A blank `description` clears it.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCampaign,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET \
                name = COALESCE($2, name), \
                description = CASE WHEN $3::TEXT IS NULL THEN description \
                                   ELSE NULLIF(BTRIM($3), '') END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Make this the world's only active campaign.
    pub async fn activate(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE campaigns SET is_active = FALSE \
             WHERE world_id = (SELECT world_id FROM campaigns WHERE id = $1) \
               AND id <> $1 AND is_active",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!("UPDATE campaigns SET is_active = TRUE WHERE id = $1 RETURNING {COLUMNS}");
        let campaign = sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(campaign)
    }

    /// The active campaign, or the only campaign when there is exactly one.
    pub async fn current_for_world(
        pool: &PgPool,
        world_id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let campaigns = Self::list_for_world(pool, world_id).await?;
        if let Some(active) = campaigns.iter().find(|c| c.is_active) {
            return Ok(Some(active.clone()));
        }
        Ok(match campaigns.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        })
    }
}
