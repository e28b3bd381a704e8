//! Rows returned by global search.

use chronicis_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// An article hit before snippets and paths are attached.
#[derive(Debug, Clone, FromRow)]
pub struct SearchHit {
    pub id: DbId,
    pub world_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub body: Option<String>,
    pub article_type: String,
    pub updated_at: Timestamp,
}
