//! Repository for `hashtags`, `article_hashtags` and `world_hashtag_links`.
//!
//! Hashtag names are shared by every world. Which article a tag points at is
//! decided per world: the first non-private article whose generated slug
//! equals the tag name.

use chronicis_core::hashtags::ParsedHashtag;
use chronicis_core::slug::generate_slug;
use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::Article;
use crate::models::hashtag::HashtagUsage;

/// Provides hashtag synchronisation and usage listing.
pub struct HashtagRepo;

impl HashtagRepo {
    /// Replace the hashtags of `article` inside a transaction.
    ///
    /// Missing hashtags are created. Every tag still unlinked in the
    /// article's world is matched against the world's article titles.
    pub(crate) async fn replace_for_article_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        article: &Article,
        hashtags: &[ParsedHashtag],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM article_hashtags WHERE article_id = $1")
            .bind(article.id)
            .execute(&mut **tx)
            .await?;

        let mut tag_ids = Vec::with_capacity(hashtags.len());
        for tag in hashtags {
            let (hashtag_id,): (DbId,) = sqlx::query_as(
                "INSERT INTO hashtags (name) VALUES ($1) \
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
                 RETURNING id",
            )
            .bind(&tag.name)
            .fetch_one(&mut **tx)
            .await?;

            sqlx::query(
                "INSERT INTO article_hashtags (article_id, hashtag_id, position) VALUES ($1, $2, $3) \
                 ON CONFLICT (article_id, hashtag_id) DO NOTHING",
            )
            .bind(article.id)
            .bind(hashtag_id)
            .bind(tag.position)
            .execute(&mut **tx)
            .await?;
            tag_ids.push((hashtag_id, tag.name.as_str()));
        }

        if let Some(world_id) = article.world_id {
            Self::link_unlinked_tx(tx, world_id, &tag_ids).await?;
        }
        Ok(())
    }

    /// Link any of `tags` that have no target yet in `world_id`.
    async fn link_unlinked_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        world_id: DbId,
        tags: &[(DbId, &str)],
    ) -> Result<(), sqlx::Error> {
        if tags.is_empty() {
            return Ok(());
        }
        let ids: Vec<DbId> = tags.iter().map(|(id, _)| *id).collect();
        let linked: Vec<(DbId,)> = sqlx::query_as(
            "SELECT hashtag_id FROM world_hashtag_links \
             WHERE world_id = $1 AND hashtag_id = ANY($2)",
        )
        .bind(world_id)
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await?;
        let pending: Vec<&(DbId, &str)> = tags
            .iter()
            .filter(|(id, _)| !linked.iter().any(|(l,)| l == id))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        // Generated slugs are computed here, so titles are matched in memory.
        let titles: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT id, title FROM articles \
             WHERE world_id = $1 AND visibility <> 'private' \
             ORDER BY parent_id NULLS FIRST, created_at",
        )
        .bind(world_id)
        .fetch_all(&mut **tx)
        .await?;

        for (hashtag_id, name) in pending {
            let target = titles
                .iter()
                .find(|(_, title)| generate_slug(title) == *name)
                .map(|(id, _)| *id);
            if let Some(article_id) = target {
                Self::insert_link_tx(tx, world_id, *hashtag_id, article_id).await?;
            }
        }
        Ok(())
    }

    /// Point still-unlinked tags named after `article`'s title at it.
    ///
    /// Runs whenever an article is created or saved, so a tag used before its
    /// article existed picks the article up once it does.
    pub(crate) async fn link_by_title_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        article: &Article,
    ) -> Result<(), sqlx::Error> {
        let Some(world_id) = article.world_id else {
            return Ok(());
        };
        if article.visibility == "private" || article.title.trim().is_empty() {
            return Ok(());
        }
        let name = generate_slug(&article.title);
        let hashtag: Option<(DbId,)> = sqlx::query_as("SELECT id FROM hashtags WHERE name = $1")
            .bind(&name)
            .fetch_optional(&mut **tx)
            .await?;
        if let Some((hashtag_id,)) = hashtag {
            Self::insert_link_tx(tx, world_id, hashtag_id, article.id).await?;
        }
        Ok(())
    }

    async fn insert_link_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        world_id: DbId,
        hashtag_id: DbId,
        article_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO world_hashtag_links (world_id, hashtag_id, article_id) VALUES ($1, $2, $3) \
             ON CONFLICT (world_id, hashtag_id) DO NOTHING",
        )
        .bind(world_id)
        .bind(hashtag_id)
        .bind(article_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Hashtags used in a world's articles, most used first.
    ///
    /// `linked_article_id` is always an article of the same world.
    pub async fn list_for_world(pool: &PgPool, world_id: DbId) -> Result<Vec<HashtagUsage>, sqlx::Error> {
        sqlx::query_as::<_, HashtagUsage>(
            "SELECT h.id, h.name, l.article_id AS linked_article_id, COUNT(*) AS usage_count \
             FROM hashtags h \
             JOIN article_hashtags ah ON ah.hashtag_id = h.id \
             JOIN articles a ON a.id = ah.article_id \
             LEFT JOIN world_hashtag_links l ON l.hashtag_id = h.id AND l.world_id = $1 \
             WHERE a.world_id = $1 \
             GROUP BY h.id, h.name, l.article_id \
             ORDER BY usage_count DESC, h.name",
        )
        .bind(world_id)
        .fetch_all(pool)
        .await
    }
}
