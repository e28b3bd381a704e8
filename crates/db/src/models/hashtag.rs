//! Hashtags extracted from article bodies.

use chronicis_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A hashtag with how many articles of one world use it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HashtagUsage {
    pub id: DbId,
    pub name: String,
    pub linked_article_id: Option<DbId>,
    pub usage_count: i64,
}
