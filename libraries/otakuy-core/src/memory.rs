//! In-memory `AlbumStore`
//!
//! Used by tests and by embedders that do not need persistence. Locks are
//! never held across an await.

use crate::error::Result;
use crate::storage::{AlbumField, AlbumFilter, AlbumStore, Page};
use crate::types::{Album, AlbumId};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryAlbumStore {
    albums: RwLock<BTreeMap<AlbumId, Album>>,
}

impl InMemoryAlbumStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored albums
    pub async fn len(&self) -> usize {
        self.albums.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.albums.read().await.is_empty()
    }
}

#[async_trait]
impl AlbumStore for InMemoryAlbumStore {
    async fn get(&self, id: &AlbumId) -> Result<Option<Album>> {
        Ok(self.albums.read().await.get(id).cloned())
    }

    async fn save(&self, album: Album) -> Result<Album> {
        self.albums
            .write()
            .await
            .insert(album.id.clone(), album.clone());
        Ok(album)
    }

    async fn delete(&self, album: &Album) -> Result<bool> {
        Ok(self.albums.write().await.remove(&album.id).is_some())
    }

    async fn find_by_title_active_or_pending(&self, title: &str) -> Result<Vec<Album>> {
        Ok(self
            .albums
            .read()
            .await
            .values()
            .filter(|album| album.title == title && album.status.reserves_title())
            .cloned()
            .collect())
    }

    async fn find_filtered(&self, filter: &AlbumFilter, page: Option<Page>) -> Result<Vec<Album>> {
        let albums = self.albums.read().await;
        let matching = albums.values().rev().filter(|album| filter.matches(album));

        Ok(match page {
            Some(page) => matching
                .skip(page.offset() as usize)
                .take(page.size as usize)
                .cloned()
                .collect(),
            None => matching.cloned().collect(),
        })
    }

    async fn count(&self, filter: &AlbumFilter) -> Result<u64> {
        let albums = self.albums.read().await;
        Ok(albums.values().filter(|album| filter.matches(album)).count() as u64)
    }

    async fn bulk_set_field(&self, ids: &BTreeSet<AlbumId>, field: AlbumField) -> Result<u64> {
        let mut albums = self.albums.write().await;
        let mut modified = 0;
        for id in ids {
            if let Some(album) = albums.get_mut(id) {
                if field.apply(album) {
                    modified += 1;
                }
            }
        }
        Ok(modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlbumDraft, AlbumStatus, UserId};

    fn album_with_id(id: &str, status: AlbumStatus) -> Album {
        let mut album = Album::from_draft(AlbumDraft::new(id, "X"), UserId::new("u1"));
        album.id = AlbumId::new(id);
        album.status = status;
        album
    }

    #[tokio::test]
    async fn filtered_scan_is_newest_first() {
        let store = InMemoryAlbumStore::new();
        for id in ["a1", "a3", "a2"] {
            store.save(album_with_id(id, AlbumStatus::Active)).await.unwrap();
        }

        let ids: Vec<_> = store
            .find_filtered(&AlbumFilter::Status(AlbumStatus::Active), None)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a3", "a2", "a1"]);
    }

    #[tokio::test]
    async fn bulk_update_skips_missing_ids() {
        let store = InMemoryAlbumStore::new();
        store.save(album_with_id("x", AlbumStatus::Pending)).await.unwrap();

        let ids = BTreeSet::from([AlbumId::new("x"), AlbumId::new("y")]);
        let modified = store
            .bulk_set_field(&ids, AlbumField::Status(AlbumStatus::Active))
            .await
            .unwrap();

        assert_eq!(modified, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn delete_reports_missing_record() {
        let store = InMemoryAlbumStore::new();
        let album = album_with_id("x", AlbumStatus::Pending);
        store.save(album.clone()).await.unwrap();

        assert!(store.delete(&album).await.unwrap());
        assert!(!store.delete(&album).await.unwrap());
    }
}
