//! Quests tracked per arc, and their running updates.

use chronicis_core::kinds::QuestStatus;
use chronicis_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `quests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quest {
    pub id: DbId,
    pub arc_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub is_gm_only: bool,
    pub sort_order: i32,
    /// Incremented on every edit; clients echo it back to detect conflicts.
    pub row_version: i32,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A quest with update statistics, as listed per arc.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub quest: Quest,
    pub update_count: i64,
    pub last_update_at: Option<Timestamp>,
}

/// Request body for `POST /arcs/{id}/quests`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<QuestStatus>,
    #[serde(default)]
    pub is_gm_only: bool,
    pub sort_order: Option<i32>,
}

/// Request body for `PUT /quests/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<QuestStatus>,
    pub is_gm_only: Option<bool>,
    pub sort_order: Option<i32>,
    /// The version the client last saw.
    pub row_version: i32,
}

/// A row from the `quest_updates` table joined with its author.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestUpdate {
    pub id: DbId,
    pub quest_id: DbId,
    pub session_id: Option<DbId>,
    pub body: String,
    pub created_by: DbId,
    pub author_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /quests/{id}/updates`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestUpdate {
    pub body: String,
    pub session_id: Option<DbId>,
}

/// One page of updates.
#[derive(Debug, Clone, Serialize)]
pub struct QuestUpdatePage {
    pub items: Vec<QuestUpdate>,
    pub total: i64,
    pub skip: i64,
    pub take: i64,
}
