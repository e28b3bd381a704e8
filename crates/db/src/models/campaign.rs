//! Campaigns, arcs and sessions.

use chronicis_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

/// A row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub world_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /worlds/{id}/campaigns`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub name: String,
    pub description: Option<String>,
}

/// Request body for `PUT /campaigns/{id}`. Blank `description` clears it.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCampaign {
    pub name: Option<String>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Arcs
// ---------------------------------------------------------------------------

/// A row from the `arcs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoryArc {
    pub id: DbId,
    pub campaign_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub private_notes: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An arc with its session count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArcWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub arc: StoryArc,
    pub session_count: i64,
}

/// Request body for `POST /campaigns/{id}/arcs`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArc {
    pub name: String,
    pub description: Option<String>,
    pub private_notes: Option<String>,
    /// `0` or absent appends after the last arc.
    pub sort_order: Option<i32>,
}

/// Request body for `PUT /arcs/{id}`. Blank text clears a field.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateArc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub private_notes: Option<String>,
    pub sort_order: Option<i32>,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub arc_id: DbId,
    pub name: String,
    pub session_date: Option<Timestamp>,
    pub public_notes: Option<String>,
    pub private_notes: Option<String>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /arcs/{id}/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSession {
    pub name: String,
    pub session_date: Option<Timestamp>,
    pub public_notes: Option<String>,
    pub private_notes: Option<String>,
}

/// Request body for `PATCH /sessions/{id}`. Blank notes clear them.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSessionNotes {
    pub name: Option<String>,
    pub session_date: Option<Timestamp>,
    pub public_notes: Option<String>,
    pub private_notes: Option<String>,
}

/// Where a user is currently playing in a world.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveContext {
    pub world_id: DbId,
    pub campaign: Option<Campaign>,
    pub arc: Option<StoryArc>,
}
