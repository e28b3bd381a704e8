//! Pure domain logic for the Chronicis campaign wiki.
//!
//! Nothing in this crate performs I/O; the `db` and `api` crates call into it
//! for validation, text processing, and tree walking.

pub mod auto_link;
pub mod documents;
pub mod error;
pub mod hashtags;
pub mod hierarchy;
pub mod invitation;
pub mod kinds;
pub mod links;
pub mod search;
pub mod slug;
pub mod types;
pub mod validation;
