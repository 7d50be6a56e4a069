//! Catalog query service
//!
//! Named listings over the album store. Every listing is sorted newest first
//! (descending album id) and drops the gated download resource.

use crate::error::{OtakuyError, Result};
use crate::storage::{AlbumFilter, AlbumStore, Page};
use crate::types::{Album, AlbumStatus, UserId};
use crate::visibility::withhold_gated_resource;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Page size of public listings
pub const PUBLIC_PAGE_SIZE: u32 = 16;

/// Page size of per-owner listings
pub const OWNER_PAGE_SIZE: u32 = 10;

/// Public filter kinds, all scoped to active albums
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    ByTime,
    ByTitle,
    ByTag,
    ByArtist,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByTime => "byTime",
            Self::ByTitle => "byTitle",
            Self::ByTag => "byTag",
            Self::ByArtist => "byArtist",
        }
    }

    fn to_filter(self, param: &str) -> AlbumFilter {
        match self {
            Self::ByTime => AlbumFilter::Status(AlbumStatus::Active),
            Self::ByTitle => AlbumFilter::ActiveByTitle(param.to_string()),
            Self::ByTag => AlbumFilter::ActiveByTag(param.to_string()),
            Self::ByArtist => AlbumFilter::ActiveByArtist(param.to_string()),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = OtakuyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "byTime" => Ok(Self::ByTime),
            "byTitle" => Ok(Self::ByTitle),
            "byTag" => Ok(Self::ByTag),
            "byArtist" => Ok(Self::ByArtist),
            other => Err(OtakuyError::validation(format!(
                "Unknown filter: {other}"
            ))),
        }
    }
}

/// Whether a title can still be submitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleCheck {
    /// No pending or active album holds the title
    pub available: bool,
    /// Active albums with the title; pending holders are not disclosed
    pub albums: Vec<Album>,
}

#[derive(Clone)]
pub struct CatalogQuery {
    store: Arc<dyn AlbumStore>,
}

impl CatalogQuery {
    pub fn new(store: Arc<dyn AlbumStore>) -> Self {
        Self { store }
    }

    /// Dispatch a public listing by filter name
    ///
    /// Unknown names fail with `OtakuyError::Validation`.
    pub async fn dispatch(&self, kind: &str, param: &str, page: u32) -> Result<Vec<Album>> {
        let kind = kind.parse::<FilterKind>()?;
        self.list(kind, param, page).await
    }

    /// Public listing of active albums; `param` is ignored for `ByTime`
    pub async fn list(&self, kind: FilterKind, param: &str, page: u32) -> Result<Vec<Album>> {
        self.scan(
            &kind.to_filter(param),
            Some(Page::new(page, PUBLIC_PAGE_SIZE)),
        )
        .await
    }

    /// All albums of an owner, optionally only active ones
    pub async fn by_owner(&self, owner: &UserId, active_only: bool, page: u32) -> Result<Vec<Album>> {
        let filter = if active_only {
            AlbumFilter::OwnerActive(owner.clone())
        } else {
            AlbumFilter::Owner(owner.clone())
        };
        self.scan(&filter, Some(Page::new(page, OWNER_PAGE_SIZE)))
            .await
    }

    /// Pending and active albums of an owner
    pub async fn by_owner_not_rejected(&self, owner: &UserId, page: u32) -> Result<Vec<Album>> {
        self.scan(
            &AlbumFilter::OwnerNotRejected(owner.clone()),
            Some(Page::new(page, OWNER_PAGE_SIZE)),
        )
        .await
    }

    /// Albums flagged for the front page, unpaginated
    pub async fn recommended(&self) -> Result<Vec<Album>> {
        self.scan(&AlbumFilter::Recommended(true), None).await
    }

    /// Moderation queue: albums in one status
    pub async fn by_status(&self, status: AlbumStatus, page: u32) -> Result<Vec<Album>> {
        self.scan(
            &AlbumFilter::Status(status),
            Some(Page::new(page, PUBLIC_PAGE_SIZE)),
        )
        .await
    }

    /// Title check ahead of a submission, same match as the duplicate guard
    pub async fn check_title(&self, title: &str) -> Result<TitleCheck> {
        let title = title.trim();
        if title.is_empty() {
            return Err(OtakuyError::validation("title must not be empty"));
        }
        let holders = self.store.find_by_title_active_or_pending(title).await?;
        Ok(TitleCheck {
            available: holders.is_empty(),
            albums: holders
                .into_iter()
                .filter(|a| a.status == AlbumStatus::Active)
                .map(withhold_gated_resource)
                .collect(),
        })
    }

    pub async fn count_by_status(&self, status: AlbumStatus) -> Result<u64> {
        self.store.count(&AlbumFilter::Status(status)).await
    }

    pub async fn count_recommended(&self, flag: bool) -> Result<u64> {
        self.store.count(&AlbumFilter::Recommended(flag)).await
    }

    async fn scan(&self, filter: &AlbumFilter, page: Option<Page>) -> Result<Vec<Album>> {
        let albums = self.store.find_filtered(filter, page).await?;
        Ok(albums.into_iter().map(withhold_gated_resource).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryAlbumStore;
    use crate::types::{AlbumDraft, AlbumId, DownloadRes};

    async fn seeded(count: usize, status: AlbumStatus) -> CatalogQuery {
        let store = Arc::new(InMemoryAlbumStore::new());
        for n in 0..count {
            let mut draft = AlbumDraft::new(format!("album {n:02}"), "X");
            draft.tags.insert("jpop".to_string());
            draft.download_res = Some(DownloadRes::new("https://pan.example.com", 1));
            let mut album = Album::from_draft(draft, UserId::new("u1"));
            album.id = AlbumId::new(format!("id-{n:02}"));
            album.status = status;
            store.save(album).await.unwrap();
        }
        CatalogQuery::new(store)
    }

    fn ids(albums: &[Album]) -> Vec<String> {
        albums.iter().map(|a| a.id.to_string()).collect()
    }

    #[test]
    fn filter_names_parse() {
        assert_eq!("byTag".parse::<FilterKind>().unwrap(), FilterKind::ByTag);
        assert!(matches!(
            "byMood".parse::<FilterKind>(),
            Err(OtakuyError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn pages_are_disjoint_and_descending() {
        let catalog = seeded(20, AlbumStatus::Active).await;

        let first = catalog.list(FilterKind::ByTime, "", 0).await.unwrap();
        let second = catalog.list(FilterKind::ByTime, "", 1).await.unwrap();

        assert_eq!(first.len(), 16);
        assert_eq!(second.len(), 4);
        assert_eq!(first[0].id.as_str(), "id-19");
        assert_eq!(second.last().unwrap().id.as_str(), "id-00");
        assert!(ids(&first).iter().all(|id| !ids(&second).contains(id)));
    }

    #[tokio::test]
    async fn listings_never_carry_download_res() {
        let catalog = seeded(3, AlbumStatus::Active).await;
        let albums = catalog.list(FilterKind::ByTag, "jpop", 0).await.unwrap();
        assert_eq!(albums.len(), 3);
        assert!(albums.iter().all(|a| a.download_res.is_none()));
    }

    #[tokio::test]
    async fn pending_albums_stay_out_of_public_listings() {
        let catalog = seeded(3, AlbumStatus::Pending).await;
        assert!(catalog.list(FilterKind::ByTime, "", 0).await.unwrap().is_empty());
        assert_eq!(catalog.by_status(AlbumStatus::Pending, 0).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn owner_listing_uses_owner_page_size() {
        let catalog = seeded(12, AlbumStatus::Pending).await;
        let owner = UserId::new("u1");

        assert_eq!(catalog.by_owner(&owner, false, 0).await.unwrap().len(), 10);
        assert_eq!(catalog.by_owner(&owner, false, 1).await.unwrap().len(), 2);
        assert!(catalog.by_owner(&owner, true, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn title_check_follows_duplicate_guard() {
        let catalog = seeded(1, AlbumStatus::Pending).await;

        let pending = catalog.check_title(" album 00 ").await.unwrap();
        assert!(!pending.available);
        assert!(pending.albums.is_empty());

        let free = catalog.check_title("album 99").await.unwrap();
        assert!(free.available);

        assert!(matches!(
            catalog.check_title("  ").await,
            Err(OtakuyError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn title_check_lists_active_holder_without_resource() {
        let catalog = seeded(1, AlbumStatus::Active).await;
        let check = catalog.check_title("album 00").await.unwrap();
        assert!(!check.available);
        assert_eq!(ids(&check.albums), vec!["id-00".to_string()]);
        assert!(check.albums[0].download_res.is_none());
    }

    #[tokio::test]
    async fn rejected_album_leaves_title_free() {
        let catalog = seeded(1, AlbumStatus::Rejected).await;
        assert!(catalog.check_title("album 00").await.unwrap().available);
    }

    #[tokio::test]
    async fn unknown_filter_is_client_error() {
        let catalog = seeded(1, AlbumStatus::Active).await;
        let err = catalog.dispatch("byMood", "", 0).await.unwrap_err();
        assert!(err.is_client_error());
    }
}
