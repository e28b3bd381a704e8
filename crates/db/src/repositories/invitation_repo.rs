//! Repository for the `world_invitations` table and joining by code.

use chronicis_core::kinds::WorldRole;
use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::member::{NewInvitation, WorldInvitation, WorldMember};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, world_id, code, role, created_by, expires_at, max_uses, used_count, \
                       is_active, created_at, updated_at";

const MEMBER_COLUMNS: &str =
    "id, world_id, user_id, role, joined_at, invited_by, created_at, updated_at";

/// Why a join attempt did or did not add a member.
#[derive(Debug)]
pub enum JoinOutcome {
    Joined(WorldMember),
    UnknownCode,
    Inactive,
    Expired,
    Exhausted,
    AlreadyMember,
}

/// Provides invitation CRUD and redemption.
pub struct InvitationRepo;

impl InvitationRepo {
    /// Insert a new invitation, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewInvitation) -> Result<WorldInvitation, sqlx::Error> {
        let query = format!(
            "INSERT INTO world_invitations (world_id, code, role, created_by, expires_at, max_uses) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorldInvitation>(&query)
            .bind(input.world_id)
            .bind(&input.code)
            .bind(input.role.as_str())
            .bind(input.created_by)
            .bind(input.expires_at)
            .bind(input.max_uses)
            .fetch_one(pool)
            .await
    }

    /// Whether any invitation already uses `code`.
    pub async fn code_exists(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM world_invitations WHERE code = $1)")
                .bind(code)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Invitations of a world, newest first.
    pub async fn list_for_world(
        pool: &PgPool,
        world_id: DbId,
    ) -> Result<Vec<WorldInvitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM world_invitations WHERE world_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, WorldInvitation>(&query)
            .bind(world_id)
            .fetch_all(pool)
            .await
    }

    /// Deactivate an invitation. Returns `true` if one was found in the world.
    pub async fn revoke(pool: &PgPool, world_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE world_invitations SET is_active = FALSE WHERE id = $1 AND world_id = $2",
        )
        .bind(id)
        .bind(world_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Redeem `code` for `user_id`.
    ///
    /// The invitation row is locked while checking it, so concurrent joins
    /// cannot exceed `max_uses`. Adding the member and counting the use
    /// commit together.
    pub async fn join(pool: &PgPool, code: &str, user_id: DbId) -> Result<JoinOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM world_invitations WHERE code = $1 FOR UPDATE");
        let Some(invitation) = sqlx::query_as::<_, WorldInvitation>(&query)
            .bind(code)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(JoinOutcome::UnknownCode);
        };

        if !invitation.is_active {
            return Ok(JoinOutcome::Inactive);
        }
        if invitation.expires_at.is_some_and(|at| at <= chrono::Utc::now()) {
            return Ok(JoinOutcome::Expired);
        }
        if invitation.max_uses.is_some_and(|max| invitation.used_count >= max) {
            return Ok(JoinOutcome::Exhausted);
        }

        let (already,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM world_members WHERE world_id = $1 AND user_id = $2)",
        )
        .bind(invitation.world_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Ok(JoinOutcome::AlreadyMember);
        }

        let role = WorldRole::from_name(&invitation.role).unwrap_or(WorldRole::Player);
        let query = format!(
            "INSERT INTO world_members (world_id, user_id, role, invited_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {MEMBER_COLUMNS}"
        );
        let member = sqlx::query_as::<_, WorldMember>(&query)
            .bind(invitation.world_id)
            .bind(user_id)
            .bind(role.as_str())
            .bind(invitation.created_by)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE world_invitations SET used_count = used_count + 1 WHERE id = $1")
            .bind(invitation.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(JoinOutcome::Joined(member))
    }
}
