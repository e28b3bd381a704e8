//! World membership and invitations.

use chronicis_core::kinds::WorldRole;
use chronicis_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `world_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorldMember {
    pub id: DbId,
    pub world_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub joined_at: Timestamp,
    pub invited_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A member joined with their user profile.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberWithUser {
    pub id: DbId,
    pub world_id: DbId,
    pub user_id: DbId,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub joined_at: Timestamp,
    pub invited_by: Option<DbId>,
}

/// Request body for `PUT /worlds/{id}/members/{member_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRole {
    pub role: WorldRole,
}

/// A row from the `world_invitations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorldInvitation {
    pub id: DbId,
    pub world_id: DbId,
    pub code: String,
    pub role: String,
    pub created_by: DbId,
    pub expires_at: Option<Timestamp>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /worlds/{id}/invitations`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitation {
    pub role: Option<WorldRole>,
    pub expires_in_days: Option<i64>,
    pub max_uses: Option<i32>,
}

/// Validated insert for a new invitation.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub world_id: DbId,
    pub code: String,
    pub role: WorldRole,
    pub created_by: DbId,
    pub expires_at: Option<Timestamp>,
    pub max_uses: Option<i32>,
}

/// Request body for `POST /worlds/join`.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinWorld {
    pub code: String,
}
