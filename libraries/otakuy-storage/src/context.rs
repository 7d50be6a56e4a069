/// `AlbumStore` backed by `SQLite`
use crate::albums;
use async_trait::async_trait;
use otakuy_core::storage::{AlbumField, AlbumFilter, AlbumStore, Page};
use otakuy_core::{Album, AlbumId, Result};
use sqlx::SqlitePool;
use std::collections::BTreeSet;

/// Album store over a shared connection pool
///
/// Every method delegates to the matching query in [`crate::albums`].
#[derive(Clone)]
pub struct SqliteAlbumStore {
    pool: SqlitePool,
}

impl SqliteAlbumStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AlbumStore for SqliteAlbumStore {
    async fn get(&self, id: &AlbumId) -> Result<Option<Album>> {
        Ok(albums::get_by_id(&self.pool, id).await?)
    }

    async fn save(&self, album: Album) -> Result<Album> {
        albums::save(&self.pool, &album).await?;
        Ok(album)
    }

    async fn delete(&self, album: &Album) -> Result<bool> {
        Ok(albums::delete(&self.pool, &album.id).await?)
    }

    async fn find_by_title_active_or_pending(&self, title: &str) -> Result<Vec<Album>> {
        Ok(albums::find_by_title_active_or_pending(&self.pool, title).await?)
    }

    async fn find_filtered(&self, filter: &AlbumFilter, page: Option<Page>) -> Result<Vec<Album>> {
        Ok(albums::find_filtered(&self.pool, filter, page).await?)
    }

    async fn count(&self, filter: &AlbumFilter) -> Result<u64> {
        Ok(albums::count(&self.pool, filter).await?)
    }

    async fn bulk_set_field(&self, ids: &BTreeSet<AlbumId>, field: AlbumField) -> Result<u64> {
        Ok(albums::bulk_set_field(&self.pool, ids, field).await?)
    }
}
