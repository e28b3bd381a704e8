//! Worlds: the top-level tenant.

use chronicis_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `worlds` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct World {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub is_public: bool,
    pub public_slug: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A world as listed for one member.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorldListItem {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub owner_name: String,
    pub is_public: bool,
    pub public_slug: Option<String>,
    pub role: String,
    pub member_count: i64,
    pub campaign_count: i64,
    pub created_at: Timestamp,
}

/// Request body for `POST /worlds`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorld {
    pub name: String,
    pub description: Option<String>,
}

/// Validated insert for a new world.
#[derive(Debug, Clone)]
pub struct NewWorld {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub owner_id: DbId,
}

/// Request body for `PUT /worlds/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorld {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub public_slug: Option<String>,
}

/// Request body for `POST /worlds/{id}/check-public-slug`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckPublicSlug {
    pub slug: String,
}

/// Answer to a public slug availability check.
#[derive(Debug, Clone, Serialize)]
pub struct PublicSlugCheck {
    pub is_available: bool,
    pub validation_error: Option<String>,
    pub suggested_slug: Option<String>,
}

/// The full set of mutable columns after an update has been merged.
#[derive(Debug, Clone)]
pub struct WorldChanges {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub public_slug: Option<String>,
}

/// One line of the system administrator's world overview.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminWorldSummary {
    pub id: DbId,
    pub name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub campaign_count: i64,
    pub arc_count: i64,
    pub article_count: i64,
    pub created_at: Timestamp,
}
