//! Repository for the `articles` table.
//!
//! Tree queries honour per-article visibility: private articles are only
//! returned to their creator. Hierarchy walks load a world's skeleton once
//! and walk it in memory with `chronicis_core::hierarchy`.

use chronicis_core::hashtags::ParsedHashtag;
use chronicis_core::links::ParsedLink;
use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::{
    Article, ArticleChanges, ArticleSkeleton, ArticleSummary, ArticleTreeItem, CharacterClaim,
    ClaimedCharacter, NewArticle,
};
use crate::repositories::{HashtagRepo, LinkRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, world_id, parent_id, campaign_id, arc_id, session_id, title, slug, body, \
                       article_type, visibility, icon_emoji, effective_date, in_game_date, player_id, \
                       created_by, modified_by, ai_summary, ai_summary_generated_at, created_at, updated_at";

const SKELETON_COLUMNS: &str =
    "id, world_id, parent_id, campaign_id, arc_id, title, slug, article_type, visibility, created_by";

/// Select list for [`ArticleTreeItem`] over alias `a`; `$viewer` is the
/// placeholder holding the viewing user's ID.
fn tree_select(viewer: &str) -> String {
    format!(
        "SELECT a.id, a.world_id, a.parent_id, a.campaign_id, a.arc_id, a.session_id, a.title, \
                a.slug, a.article_type, a.visibility, a.icon_emoji, a.effective_date, a.player_id, \
                a.created_by, \
                EXISTS (SELECT 1 FROM articles c WHERE c.parent_id = a.id \
                        AND (c.visibility <> 'private' OR c.created_by = {viewer})) AS has_children, \
                (SELECT COUNT(*) FROM articles c WHERE c.parent_id = a.id \
                        AND (c.visibility <> 'private' OR c.created_by = {viewer})) AS child_count, \
                a.created_at, a.updated_at \
         FROM articles a"
    )
}

/// Provides CRUD, tree and hierarchy queries for articles.
pub struct ArticleRepo;

impl ArticleRepo {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert an article inside an existing transaction.
    pub(crate) async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewArticle,
    ) -> Result<Article, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles (world_id, parent_id, campaign_id, arc_id, session_id, title, slug, \
                                   body, article_type, visibility, icon_emoji, effective_date, \
                                   in_game_date, player_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(input.world_id)
            .bind(input.parent_id)
            .bind(input.campaign_id)
            .bind(input.arc_id)
            .bind(input.session_id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.body)
            .bind(input.article_type.as_str())
            .bind(input.visibility.as_str())
            .bind(&input.icon_emoji)
            .bind(input.effective_date)
            .bind(&input.in_game_date)
            .bind(input.player_id)
            .bind(input.created_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert an article and record the links and hashtags found in its body.
    ///
    /// Unlinked hashtags named after the new title are pointed at it.
    pub async fn create(
        pool: &PgPool,
        input: &NewArticle,
        links: &[ParsedLink],
        hashtags: &[ParsedHashtag],
    ) -> Result<Article, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let article = Self::insert_tx(&mut tx, input).await?;
        if !links.is_empty() {
            LinkRepo::replace_for_source_tx(&mut tx, article.id, links).await?;
        }
        if !hashtags.is_empty() {
            HashtagRepo::replace_for_article_tx(&mut tx, &article, hashtags).await?;
        }
        HashtagRepo::link_by_title_tx(&mut tx, &article).await?;
        tx.commit().await?;
        Ok(article)
    }

    /// Overwrite the mutable columns.
    ///
    /// When `resync` is given the article's outgoing links and hashtags are
    /// replaced in the same transaction.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ArticleChanges,
        resync: Option<(&[ParsedLink], &[ParsedHashtag])>,
    ) -> Result<Option<Article>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE articles SET world_id = $2, parent_id = $3, campaign_id = $4, arc_id = $5, \
                    session_id = $6, title = $7, slug = $8, body = $9, article_type = $10, \
                    visibility = $11, icon_emoji = $12, effective_date = $13, in_game_date = $14, \
                    modified_by = $15 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let Some(article) = sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(changes.world_id)
            .bind(changes.parent_id)
            .bind(changes.campaign_id)
            .bind(changes.arc_id)
            .bind(changes.session_id)
            .bind(&changes.title)
            .bind(&changes.slug)
            .bind(&changes.body)
            .bind(changes.article_type.as_str())
            .bind(changes.visibility.as_str())
            .bind(&changes.icon_emoji)
            .bind(changes.effective_date)
            .bind(&changes.in_game_date)
            .bind(changes.modified_by)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some((links, hashtags)) = resync {
            LinkRepo::replace_for_source_tx(&mut tx, article.id, links).await?;
            HashtagRepo::replace_for_article_tx(&mut tx, &article, hashtags).await?;
        }
        HashtagRepo::link_by_title_tx(&mut tx, &article).await?;

        tx.commit().await?;
        Ok(Some(article))
    }

    /// Re-parent an article and give it a slug that is free under the new parent.
    pub async fn move_to(
        pool: &PgPool,
        id: DbId,
        new_parent_id: Option<DbId>,
        slug: &str,
        modified_by: DbId,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET parent_id = $2, slug = $3, modified_by = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(new_parent_id)
            .bind(slug)
            .bind(modified_by)
            .fetch_optional(pool)
            .await
    }

    /// Delete an article and every descendant in one transaction.
    ///
    /// Links pointing to or from any removed article go with them. Returns
    /// the number of articles removed.
    pub async fn delete_recursive(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let ids: Vec<(DbId,)> = sqlx::query_as(
            "WITH RECURSIVE subtree(id, depth) AS ( \
                 SELECT id, 0 FROM articles WHERE id = $1 \
                 UNION \
                 SELECT a.id, s.depth + 1 FROM articles a \
                 JOIN subtree s ON a.parent_id = s.id \
                 WHERE s.depth < 200 \
             ) \
             SELECT DISTINCT id FROM subtree",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        let ids: Vec<DbId> = ids.into_iter().map(|(id,)| id).collect();
        if ids.is_empty() {
            return Ok(0);
        }

        sqlx::query(
            "DELETE FROM article_links \
             WHERE source_article_id = ANY($1) OR target_article_id = ANY($1)",
        )
        .bind(&ids)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM articles WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find an article by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The child of `parent_id` (or root of the world when `None`) with `slug`.
    pub async fn find_by_slug(
        pool: &PgPool,
        world_id: Option<DbId>,
        parent_id: Option<DbId>,
        slug: &str,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM articles \
             WHERE world_id IS NOT DISTINCT FROM $1 \
               AND parent_id IS NOT DISTINCT FROM $2 \
               AND slug = $3"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(world_id)
            .bind(parent_id)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Slugs already used by siblings at a location, optionally ignoring one article.
    pub async fn sibling_slugs(
        pool: &PgPool,
        world_id: Option<DbId>,
        parent_id: Option<DbId>,
        exclude: Option<DbId>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT slug FROM articles \
             WHERE world_id IS NOT DISTINCT FROM $1 \
               AND parent_id IS NOT DISTINCT FROM $2 \
               AND ($3::UUID IS NULL OR id <> $3)",
        )
        .bind(world_id)
        .bind(parent_id)
        .bind(exclude)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    /// Root articles of a world visible to `viewer`, by title.
    pub async fn list_roots(
        pool: &PgPool,
        world_id: DbId,
        viewer: DbId,
    ) -> Result<Vec<ArticleTreeItem>, sqlx::Error> {
        let query = format!(
            "{} WHERE a.world_id = $1 AND a.parent_id IS NULL \
                AND (a.visibility <> 'private' OR a.created_by = $2) \
             ORDER BY a.title, a.created_at",
            tree_select("$2")
        );
        sqlx::query_as::<_, ArticleTreeItem>(&query)
            .bind(world_id)
            .bind(viewer)
            .fetch_all(pool)
            .await
    }

    /// Root tutorial articles (no world), by title.
    pub async fn list_tutorial_roots(
        pool: &PgPool,
        viewer: DbId,
    ) -> Result<Vec<ArticleTreeItem>, sqlx::Error> {
        let query = format!(
            "{} WHERE a.world_id IS NULL AND a.parent_id IS NULL AND a.article_type = 'tutorial' \
             ORDER BY a.title, a.created_at",
            tree_select("$1")
        );
        sqlx::query_as::<_, ArticleTreeItem>(&query)
            .bind(viewer)
            .fetch_all(pool)
            .await
    }

    /// Children of an article visible to `viewer`, by title.
    pub async fn list_children(
        pool: &PgPool,
        parent_id: DbId,
        viewer: DbId,
    ) -> Result<Vec<ArticleTreeItem>, sqlx::Error> {
        let query = format!(
            "{} WHERE a.parent_id = $1 \
                AND (a.visibility <> 'private' OR a.created_by = $2) \
             ORDER BY a.title, a.created_at",
            tree_select("$2")
        );
        sqlx::query_as::<_, ArticleTreeItem>(&query)
            .bind(parent_id)
            .bind(viewer)
            .fetch_all(pool)
            .await
    }

    /// Every article the viewer can read in `world_ids`, plus tutorials.
    pub async fn list_all(
        pool: &PgPool,
        world_ids: &[DbId],
        viewer: DbId,
    ) -> Result<Vec<ArticleTreeItem>, sqlx::Error> {
        let query = format!(
            "{} WHERE ((a.world_id = ANY($1) \
                        AND (a.visibility <> 'private' OR a.created_by = $2)) \
                    OR (a.world_id IS NULL AND a.article_type = 'tutorial')) \
             ORDER BY a.title, a.created_at",
            tree_select("$2")
        );
        sqlx::query_as::<_, ArticleTreeItem>(&query)
            .bind(world_ids)
            .bind(viewer)
            .fetch_all(pool)
            .await
    }

    /// Public articles of a world, for the anonymous public view.
    pub async fn list_public(pool: &PgPool, world_id: DbId) -> Result<Vec<ArticleTreeItem>, sqlx::Error> {
        // The nil UUID never matches a creator, so only public children are counted.
        let query = format!(
            "{} WHERE a.world_id = $1 AND a.visibility = 'public' \
             ORDER BY a.title, a.created_at",
            tree_select("'00000000-0000-0000-0000-000000000000'::uuid")
        );
        sqlx::query_as::<_, ArticleTreeItem>(&query)
            .bind(world_id)
            .fetch_all(pool)
            .await
    }

    /// Hierarchy skeleton of a world, or of the tutorials when `world_id` is `None`.
    pub async fn skeleton(
        pool: &PgPool,
        world_id: Option<DbId>,
    ) -> Result<Vec<ArticleSkeleton>, sqlx::Error> {
        let query = format!(
            "SELECT {SKELETON_COLUMNS} FROM articles WHERE world_id IS NOT DISTINCT FROM $1"
        );
        sqlx::query_as::<_, ArticleSkeleton>(&query)
            .bind(world_id)
            .fetch_all(pool)
            .await
    }

    /// Hierarchy skeletons of several worlds at once.
    pub async fn skeleton_for_worlds(
        pool: &PgPool,
        world_ids: &[DbId],
    ) -> Result<Vec<ArticleSkeleton>, sqlx::Error> {
        let query = format!("SELECT {SKELETON_COLUMNS} FROM articles WHERE world_id = ANY($1)");
        sqlx::query_as::<_, ArticleSkeleton>(&query)
            .bind(world_ids)
            .fetch_all(pool)
            .await
    }

    /// The subset of `ids` that exist, with their world, for link resolution.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = ANY($1)");
        sqlx::query_as::<_, Article>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Summaries
    // -----------------------------------------------------------------------

    /// Stored AI summary of an article.
    pub async fn summary(pool: &PgPool, id: DbId) -> Result<Option<ArticleSummary>, sqlx::Error> {
        sqlx::query_as::<_, ArticleSummary>(
            "SELECT id AS article_id, ai_summary AS summary, ai_summary_generated_at AS generated_at \
             FROM articles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Clear the stored summary. Returns `true` if the article exists.
    pub async fn clear_summary(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE articles SET ai_summary = NULL, ai_summary_generated_at = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Characters claimed by `user_id`, by title.
    pub async fn claimed_characters(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ClaimedCharacter>, sqlx::Error> {
        sqlx::query_as::<_, ClaimedCharacter>(
            "SELECT a.id, a.title, a.slug, a.icon_emoji, a.world_id, w.name AS world_name, a.updated_at \
             FROM articles a \
             LEFT JOIN worlds w ON w.id = a.world_id \
             WHERE a.player_id = $1 AND a.article_type = 'character' \
             ORDER BY a.title",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Claim details of an article.
    pub async fn claim(pool: &PgPool, id: DbId) -> Result<Option<CharacterClaim>, sqlx::Error> {
        sqlx::query_as::<_, CharacterClaim>(
            "SELECT a.id AS article_id, a.world_id, a.article_type, a.player_id, \
                    u.display_name AS player_name \
             FROM articles a \
             LEFT JOIN users u ON u.id = a.player_id \
             WHERE a.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Claim a character unless someone else already has.
    ///
    /// Returns `true` when the caller now holds the claim.
    pub async fn set_claim(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE articles SET player_id = $2 \
             WHERE id = $1 AND (player_id IS NULL OR player_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Release a claim held by `user_id`. Returns `true` if one was released.
    pub async fn release_claim(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE articles SET player_id = NULL WHERE id = $1 AND player_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
