//! Chronicis API server library.
//!
//! Exposes configuration, state, error handling, authentication, storage
//! and routes so integration tests and the binary share one router.

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;
pub mod tree;
