//! Repository for the `article_links` table (wiki links between articles).

use chronicis_core::links::ParsedLink;
use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::LinkedArticle;

/// Provides link synchronisation and backlink queries.
pub struct LinkRepo;

impl LinkRepo {
    /// Replace every outgoing link of `source_id` inside a transaction.
    ///
    /// Self-links and links to articles that no longer exist are dropped.
    pub(crate) async fn replace_for_source_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        source_id: DbId,
        links: &[ParsedLink],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM article_links WHERE source_article_id = $1")
            .bind(source_id)
            .execute(&mut **tx)
            .await?;

        for link in links.iter().filter(|l| l.target_id != source_id) {
            sqlx::query(
                "INSERT INTO article_links (source_article_id, target_article_id, display_text, position) \
                 SELECT $1, $2, $3, $4 \
                 WHERE EXISTS (SELECT 1 FROM articles WHERE id = $2) \
                 ON CONFLICT (source_article_id, target_article_id) DO NOTHING",
            )
            .bind(source_id)
            .bind(link.target_id)
            .bind(&link.display_text)
            .bind(link.position)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Articles linking to `target_id` that `viewer` may read, by title.
    pub async fn backlinks(
        pool: &PgPool,
        target_id: DbId,
        viewer: DbId,
    ) -> Result<Vec<LinkedArticle>, sqlx::Error> {
        sqlx::query_as::<_, LinkedArticle>(
            "SELECT a.id AS article_id, a.world_id, a.title, a.slug, a.article_type, \
                    MIN(l.display_text) AS display_text, COUNT(*) AS link_count \
             FROM article_links l \
             JOIN articles a ON a.id = l.source_article_id \
             WHERE l.target_article_id = $1 \
               AND (a.visibility <> 'private' OR a.created_by = $2) \
             GROUP BY a.id, a.world_id, a.title, a.slug, a.article_type \
             ORDER BY a.title",
        )
        .bind(target_id)
        .bind(viewer)
        .fetch_all(pool)
        .await
    }

    /// Articles `source_id` links to that `viewer` may read, in body order.
    pub async fn outgoing(
        pool: &PgPool,
        source_id: DbId,
        viewer: DbId,
    ) -> Result<Vec<LinkedArticle>, sqlx::Error> {
        sqlx::query_as::<_, LinkedArticle>(
            "SELECT a.id AS article_id, a.world_id, a.title, a.slug, a.article_type, \
                    l.display_text, 1::BIGINT AS link_count \
             FROM article_links l \
             JOIN articles a ON a.id = l.target_article_id \
             WHERE l.source_article_id = $1 \
               AND (a.visibility <> 'private' OR a.created_by = $2) \
             ORDER BY l.position",
        )
        .bind(source_id)
        .bind(viewer)
        .fetch_all(pool)
        .await
    }
}
