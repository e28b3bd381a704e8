//! Repository for the `article_aliases` table.

use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::{ArticleAlias, LinkTerm};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, article_id, alias_text, created_at, updated_at";

/// Provides alias listing and replacement.
pub struct AliasRepo;

impl AliasRepo {
    /// Aliases of an article, alphabetically.
    pub async fn list_for_article(
        pool: &PgPool,
        article_id: DbId,
    ) -> Result<Vec<ArticleAlias>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM article_aliases WHERE article_id = $1 ORDER BY alias_text"
        );
        sqlx::query_as::<_, ArticleAlias>(&query)
            .bind(article_id)
            .fetch_all(pool)
            .await
    }

    /// Replace the alias set of an article in one transaction.
    pub async fn replace(
        pool: &PgPool,
        article_id: DbId,
        aliases: &[String],
    ) -> Result<Vec<ArticleAlias>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM article_aliases WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO article_aliases (article_id, alias_text) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let mut rows = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let row = sqlx::query_as::<_, ArticleAlias>(&query)
                .bind(article_id)
                .bind(alias)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }

        tx.commit().await?;
        rows.sort_by(|a, b| a.alias_text.cmp(&b.alias_text));
        Ok(rows)
    }

    /// Titles and aliases of a world's articles that auto-linking can match.
    ///
    /// Private articles and `exclude` are left out.
    pub async fn link_terms(
        pool: &PgPool,
        world_id: DbId,
        exclude: DbId,
    ) -> Result<Vec<LinkTerm>, sqlx::Error> {
        sqlx::query_as::<_, LinkTerm>(
            "SELECT a.id AS article_id, a.title, a.title AS term, FALSE AS is_alias \
             FROM articles a \
             WHERE a.world_id = $1 AND a.id <> $2 AND a.visibility <> 'private' \
               AND BTRIM(a.title) <> '' \
             UNION ALL \
             SELECT a.id, a.title, al.alias_text, TRUE \
             FROM article_aliases al \
             JOIN articles a ON a.id = al.article_id \
             WHERE a.world_id = $1 AND a.id <> $2 AND a.visibility <> 'private'",
        )
        .bind(world_id)
        .bind(exclude)
        .fetch_all(pool)
        .await
    }
}
