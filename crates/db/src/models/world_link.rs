//! External resource links pinned to a world.

use chronicis_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `world_links` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorldLink {
    pub id: DbId,
    pub world_id: DbId,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating or replacing a world link.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldLinkInput {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
}
