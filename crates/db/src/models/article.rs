//! Articles: the hierarchical wiki pages, plus aliases, links and summaries.

use chronicis_core::error::CoreError;
use chronicis_core::hierarchy::ArticleNode;
use chronicis_core::kinds::{ArticleType, ArticleVisibility};
use chronicis_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `articles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: DbId,
    pub world_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub campaign_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub body: Option<String>,
    pub article_type: String,
    pub visibility: String,
    pub icon_emoji: Option<String>,
    pub effective_date: Timestamp,
    pub in_game_date: Option<String>,
    pub player_id: Option<DbId>,
    pub created_by: DbId,
    pub modified_by: Option<DbId>,
    pub ai_summary: Option<String>,
    pub ai_summary_generated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Article {
    pub fn kind(&self) -> Result<ArticleType, CoreError> {
        ArticleType::from_name(&self.article_type)
    }

    pub fn visibility_kind(&self) -> Result<ArticleVisibility, CoreError> {
        ArticleVisibility::from_name(&self.visibility)
    }
}

/// A tree/list entry without the body.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArticleTreeItem {
    pub id: DbId,
    pub world_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub campaign_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub article_type: String,
    pub visibility: String,
    pub icon_emoji: Option<String>,
    pub effective_date: Timestamp,
    pub player_id: Option<DbId>,
    pub created_by: DbId,
    pub has_children: bool,
    pub child_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Just enough of an article to walk the hierarchy.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleSkeleton {
    pub id: DbId,
    pub world_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub campaign_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub article_type: String,
    pub visibility: String,
    pub created_by: DbId,
}

impl ArticleSkeleton {
    /// Convert to the hierarchy node used by the path walkers.
    pub fn to_node(&self) -> Result<ArticleNode, CoreError> {
        Ok(ArticleNode {
            id: self.id,
            parent_id: self.parent_id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            article_type: ArticleType::from_name(&self.article_type)?,
            visibility: ArticleVisibility::from_name(&self.visibility)?,
            campaign_id: self.campaign_id,
            arc_id: self.arc_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Request body for `POST /articles`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticle {
    #[serde(default)]
    pub title: String,
    pub slug: Option<String>,
    pub body: Option<String>,
    pub parent_id: Option<DbId>,
    pub world_id: Option<DbId>,
    pub campaign_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub article_type: Option<ArticleType>,
    pub visibility: Option<ArticleVisibility>,
    pub icon_emoji: Option<String>,
    pub effective_date: Option<Timestamp>,
    pub in_game_date: Option<String>,
}

/// Validated insert for a new article.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub world_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub campaign_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub body: Option<String>,
    pub article_type: ArticleType,
    pub visibility: ArticleVisibility,
    pub icon_emoji: Option<String>,
    pub effective_date: Timestamp,
    pub in_game_date: Option<String>,
    pub player_id: Option<DbId>,
    pub created_by: DbId,
}

/// Request body for `PUT /articles/{id}`. Absent fields are left alone.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub body: Option<String>,
    pub article_type: Option<ArticleType>,
    pub visibility: Option<ArticleVisibility>,
    pub icon_emoji: Option<String>,
    pub effective_date: Option<Timestamp>,
    pub in_game_date: Option<String>,
}

/// The full set of mutable columns after an update has been merged.
#[derive(Debug, Clone)]
pub struct ArticleChanges {
    pub world_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub campaign_id: Option<DbId>,
    pub arc_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub body: Option<String>,
    pub article_type: ArticleType,
    pub visibility: ArticleVisibility,
    pub icon_emoji: Option<String>,
    pub effective_date: Timestamp,
    pub in_game_date: Option<String>,
    pub modified_by: DbId,
}

/// Request body for `PUT /articles/{id}/move`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveArticle {
    pub new_parent_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// A row from the `article_aliases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArticleAlias {
    pub id: DbId,
    pub article_id: DbId,
    pub alias_text: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `PUT /articles/{id}/aliases`: a comma-separated list.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAliases {
    #[serde(default)]
    pub aliases: String,
}

/// A title or alias that auto-linking can match.
#[derive(Debug, Clone, FromRow)]
pub struct LinkTerm {
    pub article_id: DbId,
    pub title: String,
    pub term: String,
    pub is_alias: bool,
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// An article on the other end of a wiki link.
#[derive(Debug, Clone, FromRow)]
pub struct LinkedArticle {
    pub article_id: DbId,
    pub world_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub article_type: String,
    pub display_text: Option<String>,
    pub link_count: i64,
}

/// Request body for `POST /articles/resolve-links`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveLinks {
    #[serde(default)]
    pub article_ids: Vec<DbId>,
}

/// Request body for `POST /articles/{id}/auto-link`.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoLinkRequest {
    #[serde(default)]
    pub body: String,
}

// ---------------------------------------------------------------------------
// Summaries and characters
// ---------------------------------------------------------------------------

/// Stored AI summary fields of an article.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArticleSummary {
    pub article_id: DbId,
    pub summary: Option<String>,
    pub generated_at: Option<Timestamp>,
}

/// A character article claimed by a user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClaimedCharacter {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub icon_emoji: Option<String>,
    pub world_id: Option<DbId>,
    pub world_name: Option<String>,
    pub updated_at: Timestamp,
}

/// Who, if anyone, has claimed a character.
#[derive(Debug, Clone, FromRow)]
pub struct CharacterClaim {
    pub article_id: DbId,
    pub world_id: Option<DbId>,
    pub article_type: String,
    pub player_id: Option<DbId>,
    pub player_name: Option<String>,
}
