//! User accounts keyed by the identity provider's subject.

use chronicis_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub auth_subject: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Identity claims presented at login.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub auth_subject: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
