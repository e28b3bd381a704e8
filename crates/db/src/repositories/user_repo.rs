//! Repository for the `users` table.

use chronicis_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{User, UserIdentity};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, auth_subject, email, display_name, avatar_url, last_login_at, \
                       created_at, updated_at";

/// Provides lookups and login upserts for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by identity-provider subject.
    pub async fn find_by_subject(
        pool: &PgPool,
        auth_subject: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE auth_subject = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(auth_subject)
            .fetch_optional(pool)
            .await
    }

    /// Return the user for `identity`, creating it on first sight.
    ///
    /// Profile fields are refreshed (and `last_login_at` stamped) only when
    /// they changed, so repeat requests do not rewrite the row.
    pub async fn get_or_create(pool: &PgPool, identity: &UserIdentity) -> Result<User, sqlx::Error> {
        if let Some(user) = Self::find_by_subject(pool, &identity.auth_subject).await? {
            let changed = user.email != identity.email
                || user.display_name != identity.display_name
                || user.avatar_url != identity.avatar_url;
            if !changed {
                return Ok(user);
            }
            let query = format!(
                "UPDATE users SET email = $2, display_name = $3, avatar_url = $4, \
                        last_login_at = NOW() \
                 WHERE id = $1 \
                 RETURNING {COLUMNS}"
            );
            return sqlx::query_as::<_, User>(&query)
                .bind(user.id)
                .bind(&identity.email)
                .bind(&identity.display_name)
                .bind(&identity.avatar_url)
                .fetch_one(pool)
                .await;
        }

        // A concurrent first request may insert the same subject.
        let query = format!(
            "INSERT INTO users (auth_subject, email, display_name, avatar_url, last_login_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             ON CONFLICT (auth_subject) DO UPDATE SET last_login_at = NOW() \
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&identity.auth_subject)
            .bind(&identity.email)
            .bind(&identity.display_name)
            .bind(&identity.avatar_url)
            .fetch_one(pool)
            .await?;
        tracing::info!(user_id = %user.id, "Created user on first login");
        Ok(user)
    }
}
