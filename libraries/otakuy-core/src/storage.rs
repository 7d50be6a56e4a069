//! Album store interface

use crate::error::Result;
use crate::types::{Album, AlbumId, AlbumStatus, UserId};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// A fixed-size, 0-indexed page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: u32,
    pub size: u32,
}

impl Page {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.index) * u64::from(self.size)
    }
}

/// Record selection understood by every `AlbumStore`
///
/// Listings built from a filter are always ordered by descending album id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumFilter {
    /// Every album in a status
    Status(AlbumStatus),
    /// Active albums with exactly this title
    ActiveByTitle(String),
    /// Active albums carrying this tag
    ActiveByTag(String),
    /// Active albums by this artist
    ActiveByArtist(String),
    /// Every album of an owner, any status
    Owner(UserId),
    /// Active albums of an owner
    OwnerActive(UserId),
    /// Pending and active albums of an owner
    OwnerNotRejected(UserId),
    /// Albums whose recommend flag equals the value
    Recommended(bool),
}

impl AlbumFilter {
    /// Evaluate the filter against a single record
    pub fn matches(&self, album: &Album) -> bool {
        let active = album.status == AlbumStatus::Active;
        match self {
            Self::Status(status) => album.status == *status,
            Self::ActiveByTitle(title) => active && album.title == *title,
            Self::ActiveByTag(tag) => active && album.tags.contains(tag),
            Self::ActiveByArtist(artist) => active && album.artist == *artist,
            Self::Owner(owner) => album.owner == *owner,
            Self::OwnerActive(owner) => active && album.owner == *owner,
            Self::OwnerNotRejected(owner) => {
                album.owner == *owner && album.status != AlbumStatus::Rejected
            }
            Self::Recommended(flag) => album.is_recommend == *flag,
        }
    }
}

/// Single field changed by a bulk update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumField {
    Status(AlbumStatus),
    Recommend(bool),
}

impl AlbumField {
    /// Apply the change; returns whether the record actually changed
    pub fn apply(&self, album: &mut Album) -> bool {
        match *self {
            Self::Status(status) if album.status != status => {
                album.status = status;
                true
            }
            Self::Recommend(flag) if album.is_recommend != flag => {
                album.is_recommend = flag;
                true
            }
            _ => false,
        }
    }
}

/// Persistence interface for album records
///
/// The store exclusively owns album state; callers work on the copies it
/// returns and write back through `save` or `bulk_set_field`. Writes to the
/// same id are last-writer-wins.
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// Point lookup
    async fn get(&self, id: &AlbumId) -> Result<Option<Album>>;

    /// Insert or replace the record with `album.id`
    async fn save(&self, album: Album) -> Result<Album>;

    /// Remove a record; returns false when it did not exist
    async fn delete(&self, album: &Album) -> Result<bool>;

    /// Albums with exactly this title whose status reserves it (pending or active)
    async fn find_by_title_active_or_pending(&self, title: &str) -> Result<Vec<Album>>;

    /// Filtered scan in descending id order; `None` returns every match
    async fn find_filtered(&self, filter: &AlbumFilter, page: Option<Page>) -> Result<Vec<Album>>;

    /// Number of records matching a filter
    async fn count(&self, filter: &AlbumFilter) -> Result<u64>;

    /// Set one field on every existing id; returns how many records changed
    async fn bulk_set_field(&self, ids: &BTreeSet<AlbumId>, field: AlbumField) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlbumDraft;

    fn album(title: &str, status: AlbumStatus) -> Album {
        let mut album = Album::from_draft(AlbumDraft::new(title, "X"), UserId::new("u1"));
        album.status = status;
        album
    }

    #[test]
    fn page_offset_is_index_times_size() {
        assert_eq!(Page::new(0, 16).offset(), 0);
        assert_eq!(Page::new(3, 10).offset(), 30);
    }

    #[test]
    fn public_filters_only_match_active() {
        let pending = album("Lonely Moon", AlbumStatus::Pending);
        let active = album("Lonely Moon", AlbumStatus::Active);
        let filter = AlbumFilter::ActiveByTitle("Lonely Moon".into());
        assert!(!filter.matches(&pending));
        assert!(filter.matches(&active));
    }

    #[test]
    fn owner_not_rejected_excludes_rejected() {
        let filter = AlbumFilter::OwnerNotRejected(UserId::new("u1"));
        assert!(filter.matches(&album("a", AlbumStatus::Pending)));
        assert!(!filter.matches(&album("a", AlbumStatus::Rejected)));
    }

    #[test]
    fn field_apply_reports_real_changes_only() {
        let mut record = album("a", AlbumStatus::Pending);
        assert!(AlbumField::Status(AlbumStatus::Active).apply(&mut record));
        assert!(!AlbumField::Status(AlbumStatus::Active).apply(&mut record));
        assert!(AlbumField::Recommend(true).apply(&mut record));
        assert!(record.is_recommend);
    }
}
