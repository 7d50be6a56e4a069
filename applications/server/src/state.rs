/// Shared application state
use crate::services::AuthService;
use otakuy_core::AlbumLifecycle;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub lifecycle: Arc<AlbumLifecycle>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        lifecycle: Arc<AlbumLifecycle>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            pool,
            lifecycle,
            auth_service,
        }
    }
}
