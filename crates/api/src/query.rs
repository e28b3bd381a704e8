//! Shared query parameter types for API handlers.

use chronicis_core::types::DbId;
use serde::Deserialize;

/// `?world_id=` filter used by article listings and path lookups.
#[derive(Debug, Deserialize)]
pub struct WorldFilter {
    pub world_id: Option<DbId>,
}

/// `?query=` used by search and link suggestions.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// `?skip=&take=` paging for quest updates. Clamped in the handler.
#[derive(Debug, Deserialize)]
pub struct SkipTakeParams {
    pub skip: Option<i64>,
    pub take: Option<i64>,
}
