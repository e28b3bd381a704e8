use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::BlobStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: chronicis_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Byte storage for world documents.
    pub blob_store: Arc<dyn BlobStore>,
}
