//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` struct matching the database row
//! - `Deserialize` request DTOs for inserts and partial updates
//! - Joined/aggregate row shapes used by list endpoints
//!
//! Enum-typed columns are stored as `TEXT` and read as `String`; handlers
//! convert them with the `chronicis_core::kinds` enums.

pub mod article;
pub mod campaign;
pub mod dashboard;
pub mod document;
pub mod hashtag;
pub mod member;
pub mod quest;
pub mod search;
pub mod user;
pub mod world;
pub mod world_link;
