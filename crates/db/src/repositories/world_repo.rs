//! Repository for the `worlds` table, including new-world seeding.

use chronicis_core::kinds::{ArticleType, ArticleVisibility, WorldRole};
use chronicis_core::slug::generate_slug;
use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::NewArticle;
use crate::models::world::{AdminWorldSummary, NewWorld, World, WorldChanges, WorldListItem};
use crate::repositories::ArticleRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, slug, description, owner_id, is_public, public_slug, created_at, updated_at";

/// Root wiki articles every new world starts with: title, icon, blurb.
const SEED_WIKI_ROOTS: &[(&str, &str, &str)] = &[
    (
        "Bestiary",
        "\u{1F409}",
        "A collection of creatures and monsters encountered in your adventures.",
    ),
    (
        "Characters",
        "\u{1F464}",
        "NPCs and notable figures in your world.",
    ),
    (
        "Factions",
        "\u{2694}\u{FE0F}",
        "Organizations, guilds, and groups that shape your world.",
    ),
    (
        "Locations",
        "\u{1F5FA}\u{FE0F}",
        "Places of interest, cities, dungeons, and landmarks.",
    ),
];

/// Provides CRUD operations for worlds.
pub struct WorldRepo;

impl WorldRepo {
    /// Create a world with its default content in one transaction.
    ///
    /// The owner becomes a GM member. The world is seeded with four public
    /// wiki roots, a "New Character" claimed by the owner, and an active
    /// "Campaign 1" holding an active "Arc 1".
    pub async fn create_with_defaults(pool: &PgPool, input: &NewWorld) -> Result<World, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO worlds (name, slug, description, owner_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let world = sqlx::query_as::<_, World>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.owner_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO world_members (world_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(world.id)
            .bind(input.owner_id)
            .bind(WorldRole::Gm.as_str())
            .execute(&mut *tx)
            .await?;

        let now = chrono::Utc::now();
        let seed = |title: &str, icon: &str, blurb: &str, kind: ArticleType| NewArticle {
            world_id: Some(world.id),
            parent_id: None,
            campaign_id: None,
            arc_id: None,
            session_id: None,
            title: title.to_string(),
            slug: generate_slug(title),
            body: Some(format!("<h1>{title}</h1><p>{blurb}</p>")),
            article_type: kind,
            visibility: ArticleVisibility::Public,
            icon_emoji: Some(icon.to_string()),
            effective_date: now,
            in_game_date: None,
            player_id: None,
            created_by: input.owner_id,
        };

        for (title, icon, blurb) in SEED_WIKI_ROOTS {
            ArticleRepo::insert_tx(&mut tx, &seed(title, icon, blurb, ArticleType::WikiArticle))
                .await?;
        }

        let character = NewArticle {
            player_id: Some(input.owner_id),
            ..seed(
                "New Character",
                "\u{1F9D9}",
                "Describe your character here. Add their backstory, personality, and goals.",
                ArticleType::Character,
            )
        };
        ArticleRepo::insert_tx(&mut tx, &character).await?;

        let (campaign_id,): (DbId,) = sqlx::query_as(
            "INSERT INTO campaigns (world_id, name, description, is_active, created_by) \
             VALUES ($1, 'Campaign 1', 'Your first campaign adventure begins here.', TRUE, $2) \
             RETURNING id",
        )
        .bind(world.id)
        .bind(input.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO arcs (campaign_id, name, description, sort_order, is_active, created_by) \
             VALUES ($1, 'Arc 1', 'The first chapter of your adventure.', 1, TRUE, $2)",
        )
        .bind(campaign_id)
        .bind(input.owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(world)
    }

    /// Find a world by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<World>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM worlds WHERE id = $1");
        sqlx::query_as::<_, World>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a public world by its public slug.
    pub async fn find_public_by_slug(
        pool: &PgPool,
        public_slug: &str,
    ) -> Result<Option<World>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM worlds WHERE public_slug = $1 AND is_public = TRUE"
        );
        sqlx::query_as::<_, World>(&query)
            .bind(public_slug)
            .fetch_optional(pool)
            .await
    }

    /// Worlds the user belongs to, with their role and member count, by name.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<WorldListItem>, sqlx::Error> {
        sqlx::query_as::<_, WorldListItem>(
            "SELECT w.id, w.name, w.slug, w.description, w.owner_id, \
                    u.display_name AS owner_name, w.is_public, w.public_slug, m.role, \
                    (SELECT COUNT(*) FROM world_members wm WHERE wm.world_id = w.id) AS member_count, \
                    (SELECT COUNT(*) FROM campaigns c WHERE c.world_id = w.id) AS campaign_count, \
                    w.created_at \
             FROM worlds w \
             JOIN world_members m ON m.world_id = w.id AND m.user_id = $1 \
             JOIN users u ON u.id = w.owner_id \
             ORDER BY w.name, w.created_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Slugs of the owner's worlds, optionally ignoring one world.
    pub async fn slugs_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        exclude_world: Option<DbId>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT slug FROM worlds WHERE owner_id = $1 AND ($2::UUID IS NULL OR id <> $2)",
        )
        .bind(owner_id)
        .bind(exclude_world)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    /// Whether another world already uses `public_slug`.
    pub async fn public_slug_taken(
        pool: &PgPool,
        public_slug: &str,
        exclude_world: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let (taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM worlds \
                            WHERE public_slug = $1 AND ($2::UUID IS NULL OR id <> $2))",
        )
        .bind(public_slug)
        .bind(exclude_world)
        .fetch_one(pool)
        .await?;
        Ok(taken)
    }

    /// Overwrite the mutable columns. Returns `None` if the world is gone.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &WorldChanges,
    ) -> Result<Option<World>, sqlx::Error> {
        let query = format!(
            "UPDATE worlds SET name = $2, slug = $3, description = $4, \
                    is_public = $5, public_slug = $6 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, World>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.slug)
            .bind(&changes.description)
            .bind(changes.is_public)
            .bind(&changes.public_slug)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // System administration
    // -----------------------------------------------------------------------

    /// Every world with owner and content counts, by name.
    pub async fn admin_summaries(pool: &PgPool) -> Result<Vec<AdminWorldSummary>, sqlx::Error> {
        sqlx::query_as::<_, AdminWorldSummary>(
            "SELECT w.id, w.name, u.display_name AS owner_name, u.email AS owner_email, \
                    (SELECT COUNT(*) FROM campaigns c WHERE c.world_id = w.id) AS campaign_count, \
                    (SELECT COUNT(*) FROM arcs a JOIN campaigns c ON c.id = a.campaign_id \
                      WHERE c.world_id = w.id) AS arc_count, \
                    (SELECT COUNT(*) FROM articles ar WHERE ar.world_id = w.id) AS article_count, \
                    w.created_at \
             FROM worlds w \
             JOIN users u ON u.id = w.owner_id \
             ORDER BY w.name, w.created_at",
        )
        .fetch_all(pool)
        .await
    }

    /// Blob paths of a world's documents, collected before the world is deleted.
    pub async fn document_blob_paths(pool: &PgPool, id: DbId) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT blob_path FROM world_documents WHERE world_id = $1")
                .bind(id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(p,)| p).collect())
    }

    /// Permanently delete a world; everything it owns cascades.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM worlds WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
