//! Aggregates shown on the dashboard.

use chronicis_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A member world with its article count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardWorldRow {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub role: String,
    pub article_count: i64,
}

/// A campaign with counts and its current arc.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardCampaignRow {
    pub id: DbId,
    pub world_id: DbId,
    pub name: String,
    pub is_active: bool,
    pub arc_count: i64,
    pub session_count: i64,
    pub current_arc_id: Option<DbId>,
    pub current_arc_name: Option<String>,
    pub latest_session_date: Option<Timestamp>,
}
