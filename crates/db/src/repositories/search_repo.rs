//! Repository for global article search.
//!
//! Matching is case-insensitive `ILIKE` over titles and bodies. Callers
//! pass already-escaped terms (see `chronicis_core::search::escape_like`).

use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::search::SearchHit;

const HIT_COLUMNS: &str = "a.id, a.world_id, a.title, a.slug, a.body, a.article_type, a.updated_at";

/// Shared filter: readable, non-tutorial articles of the given worlds.
/// `$1` is the world list, `$2` the viewer.
const READABLE: &str = "a.world_id = ANY($1) AND a.article_type <> 'tutorial' \
                        AND (a.visibility <> 'private' OR a.created_by = $2)";

/// Provides the three search categories.
pub struct SearchRepo;

impl SearchRepo {
    /// Articles whose title contains `term`, by title.
    pub async fn title_matches(
        pool: &PgPool,
        world_ids: &[DbId],
        viewer: DbId,
        escaped_term: &str,
        limit: i64,
    ) -> Result<Vec<SearchHit>, sqlx::Error> {
        let query = format!(
            "SELECT {HIT_COLUMNS} FROM articles a \
             WHERE {READABLE} AND a.title ILIKE '%' || $3 || '%' ESCAPE '\\' \
             ORDER BY a.title \
             LIMIT $4"
        );
        sqlx::query_as::<_, SearchHit>(&query)
            .bind(world_ids)
            .bind(viewer)
            .bind(escaped_term)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Articles whose body contains `term`, most recently updated first.
    pub async fn body_matches(
        pool: &PgPool,
        world_ids: &[DbId],
        viewer: DbId,
        escaped_term: &str,
        limit: i64,
    ) -> Result<Vec<SearchHit>, sqlx::Error> {
        let query = format!(
            "SELECT {HIT_COLUMNS} FROM articles a \
             WHERE {READABLE} AND a.body ILIKE '%' || $3 || '%' ESCAPE '\\' \
             ORDER BY a.updated_at DESC \
             LIMIT $4"
        );
        sqlx::query_as::<_, SearchHit>(&query)
            .bind(world_ids)
            .bind(viewer)
            .bind(escaped_term)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Articles whose body contains `#term`, most recently updated first.
    pub async fn hashtag_matches(
        pool: &PgPool,
        world_ids: &[DbId],
        viewer: DbId,
        escaped_term: &str,
        limit: i64,
    ) -> Result<Vec<SearchHit>, sqlx::Error> {
        let query = format!(
            "SELECT {HIT_COLUMNS} FROM articles a \
             WHERE {READABLE} AND a.body ILIKE '%#' || $3 || '%' ESCAPE '\\' \
             ORDER BY a.updated_at DESC \
             LIMIT $4"
        );
        sqlx::query_as::<_, SearchHit>(&query)
            .bind(world_ids)
            .bind(viewer)
            .bind(escaped_term)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
