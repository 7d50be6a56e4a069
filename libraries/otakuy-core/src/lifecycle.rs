//! Album lifecycle service
//!
//! Public-facing orchestrator: resolves callers through the identity
//! collaborator, enforces authority and gating, and delegates to the
//! moderation engine, catalog, blob storage and metadata lookup.

use crate::catalog::CatalogQuery;
use crate::error::{OtakuyError, Result};
use crate::moderation::{ModerationDecision, ModerationEngine};
use crate::storage::AlbumStore;
use crate::traits::{BlobStorage, IdentityProvider, MetadataLookup};
use crate::types::{Album, AlbumDraft, AlbumId, AlbumStatus, Caller, Suggestion, UserId};
use crate::visibility::{redact_for, require_authority, require_editable, require_moderator};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Blob key for an album's cover
pub fn cover_key(album_id: &AlbumId) -> String {
    format!("{}.png", album_id.as_str())
}

/// Background write of a freshly uploaded cover URL into the album record
///
/// The task logs its own failure. Dropping the handle detaches it; the
/// update still runs to completion.
#[derive(Debug)]
pub struct CoverUpdate {
    handle: JoinHandle<Result<()>>,
}

impl CoverUpdate {
    /// Wait for the record update and return its outcome
    pub async fn wait(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| OtakuyError::Other(format!("Cover update task failed: {e}")))?
    }
}

/// Result of a cover upload
#[derive(Debug)]
pub struct CoverUpload {
    /// Public URL of the stored cover, valid before the record update lands
    pub url: String,
    pub update: CoverUpdate,
}

/// Moderator dashboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlbumCounts {
    pub pending: u64,
    pub active: u64,
    pub rejected: u64,
    pub recommended: u64,
}

#[derive(Clone)]
pub struct AlbumLifecycle {
    store: Arc<dyn AlbumStore>,
    identity: Arc<dyn IdentityProvider>,
    blobs: Arc<dyn BlobStorage>,
    metadata: Arc<dyn MetadataLookup>,
    moderation: ModerationEngine,
    catalog: CatalogQuery,
}

impl AlbumLifecycle {
    pub fn new(
        store: Arc<dyn AlbumStore>,
        identity: Arc<dyn IdentityProvider>,
        blobs: Arc<dyn BlobStorage>,
        metadata: Arc<dyn MetadataLookup>,
    ) -> Self {
        Self {
            moderation: ModerationEngine::new(Arc::clone(&store)),
            catalog: CatalogQuery::new(Arc::clone(&store)),
            store,
            identity,
            blobs,
            metadata,
        }
    }

    /// Read-only listings
    pub fn catalog(&self) -> &CatalogQuery {
        &self.catalog
    }

    /// Resolve a credential to a full caller
    pub async fn caller(&self, credential: &str) -> Result<Caller> {
        let id = self.identity.resolve_caller_id(credential).await?;
        let star = self.identity.entitlement_level(&id).await?;
        let is_moderator = self.identity.is_moderator(&id).await?;
        Ok(Caller {
            id,
            star,
            is_moderator,
        })
    }

    /// Submit a new album owned by the caller
    pub async fn create(&self, credential: &str, draft: AlbumDraft) -> Result<Album> {
        draft.validate()?;
        let owner = self.identity.resolve_caller_id(credential).await?;
        self.moderation.create(Album::from_draft(draft, owner)).await
    }

    /// Album detail, with the download resource only if the caller qualifies
    pub async fn get(&self, credential: &str, id: &AlbumId) -> Result<Album> {
        let caller = self.caller(credential).await?;
        let album = self.load(id).await?;
        Ok(redact_for(&caller, album))
    }

    /// Edit title, artist, tags, cover, intro and download resource
    ///
    /// Owners may not edit an active album; moderators may edit any album.
    pub async fn update(&self, credential: &str, id: &AlbumId, draft: AlbumDraft) -> Result<Album> {
        draft.validate()?;
        let caller = self.caller(credential).await?;
        let mut album = self.load(id).await?;
        require_editable(&caller, &album)?;

        let previous_title = std::mem::take(&mut album.title);
        album.title = draft.title.trim().to_string();
        album.artist = draft.artist.trim().to_string();
        album.tags = draft.tags;
        if let Some(cover) = draft.cover {
            album.cover = cover;
        }
        album.intro = draft.intro;
        album.download_res = draft.download_res;

        self.moderation.update(album, &previous_title).await
    }

    /// Delete an album in any status
    pub async fn delete(&self, credential: &str, id: &AlbumId) -> Result<()> {
        let caller = self.caller(credential).await?;
        let album = self.load(id).await?;
        require_authority(&caller, &album)?;
        self.moderation.delete(&album).await
    }

    /// Store cover bytes and point the album at them in the background
    ///
    /// Same edit lock as [`update`](Self::update). Storage failures are returned to the caller. The record update runs as
    /// a separate task; the URL is returned before it is guaranteed persisted.
    pub async fn upload_cover(&self, credential: &str, id: &AlbumId, bytes: Vec<u8>) -> Result<CoverUpload> {
        let caller = self.caller(credential).await?;
        let album = self.load(id).await?;
        require_editable(&caller, &album)?;

        let url = self.blobs.store(bytes, &cover_key(&album.id)).await?;

        let store = Arc::clone(&self.store);
        let album_id = album.id;
        let cover_url = url.clone();
        let handle = tokio::spawn(async move {
            let result = set_cover(store.as_ref(), &album_id, cover_url).await;
            match &result {
                Ok(()) => tracing::info!(album_id = %album_id, "Album cover updated"),
                Err(e) => tracing::error!(album_id = %album_id, "Failed to update album cover: {}", e),
            }
            result
        });

        Ok(CoverUpload {
            url,
            update: CoverUpdate { handle },
        })
    }

    /// Bulk moderation status change
    pub async fn moderate(&self, credential: &str, ids: BTreeSet<AlbumId>, status: AlbumStatus) -> Result<u64> {
        let caller = self.caller(credential).await?;
        require_moderator(&caller)?;
        let decision = ModerationDecision {
            album_ids: ids,
            status,
            actor: caller.id,
        };
        self.moderation.apply(&decision).await
    }

    /// Bulk recommend-flag toggle
    pub async fn set_recommended(&self, credential: &str, ids: BTreeSet<AlbumId>, flag: bool) -> Result<u64> {
        let caller = self.caller(credential).await?;
        require_moderator(&caller)?;
        let modified = self.moderation.set_recommended(&ids, flag).await?;
        tracing::info!(actor = %caller.id, flag, modified, "Recommend flag updated");
        Ok(modified)
    }

    /// Albums in one status, for moderators
    pub async fn moderation_queue(&self, credential: &str, status: AlbumStatus, page: u32) -> Result<Vec<Album>> {
        let caller = self.caller(credential).await?;
        require_moderator(&caller)?;
        self.catalog.by_status(status, page).await
    }

    /// Status and recommend counters, for moderators
    pub async fn counts(&self, credential: &str) -> Result<AlbumCounts> {
        let caller = self.caller(credential).await?;
        require_moderator(&caller)?;
        Ok(AlbumCounts {
            pending: self.catalog.count_by_status(AlbumStatus::Pending).await?,
            active: self.catalog.count_by_status(AlbumStatus::Active).await?,
            rejected: self.catalog.count_by_status(AlbumStatus::Rejected).await?,
            recommended: self.catalog.count_recommended(true).await?,
        })
    }

    /// Albums of a user; `active_only` restricts to active ones
    pub async fn albums_of(&self, owner: &UserId, active_only: bool, page: u32) -> Result<Vec<Album>> {
        self.catalog.by_owner(owner, active_only, page).await
    }

    /// External catalog suggestions for a title
    pub async fn suggest(&self, title: &str) -> Result<Vec<Suggestion>> {
        self.metadata.suggest(title).await
    }

    /// External catalog record for prefilling a submission
    pub async fn detail(&self, external_id: &str) -> Result<AlbumDraft> {
        self.metadata.detail(external_id).await
    }

    async fn load(&self, id: &AlbumId) -> Result<Album> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| OtakuyError::AlbumNotFound(id.clone()))
    }
}

async fn set_cover(store: &dyn AlbumStore, id: &AlbumId, url: String) -> Result<()> {
    let mut album = store
        .get(id)
        .await?
        .ok_or_else(|| OtakuyError::AlbumNotFound(id.clone()))?;
    album.cover = url;
    store.save(album).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryAlbumStore;
    use crate::traits::{MockBlobStorage, MockIdentityProvider, MockMetadataLookup};
    use crate::types::DownloadRes;

    /// Identity where the credential is the user id; "mod" is a moderator
    fn identity(star: u32) -> MockIdentityProvider {
        let mut identity = MockIdentityProvider::new();
        identity.expect_resolve_caller_id().returning(|credential| {
            if credential.is_empty() {
                Err(OtakuyError::auth("missing token"))
            } else {
                Ok(UserId::new(credential))
            }
        });
        identity
            .expect_entitlement_level()
            .returning(move |_| Ok(star));
        identity
            .expect_is_moderator()
            .returning(|id| Ok(id.as_str() == "mod"));
        identity
    }

    fn lifecycle_with(
        store: Arc<InMemoryAlbumStore>,
        identity: MockIdentityProvider,
        blobs: MockBlobStorage,
        metadata: MockMetadataLookup,
    ) -> AlbumLifecycle {
        AlbumLifecycle::new(store, Arc::new(identity), Arc::new(blobs), Arc::new(metadata))
    }

    fn lifecycle(star: u32) -> (AlbumLifecycle, Arc<InMemoryAlbumStore>) {
        let store = Arc::new(InMemoryAlbumStore::new());
        let lifecycle = lifecycle_with(
            store.clone(),
            identity(star),
            MockBlobStorage::new(),
            MockMetadataLookup::new(),
        );
        (lifecycle, store)
    }

    fn gated_draft(title: &str, permission: u32) -> AlbumDraft {
        let mut draft = AlbumDraft::new(title, "X");
        draft.download_res = Some(DownloadRes::new("https://pan.example.com/x", permission));
        draft
    }

    #[tokio::test]
    async fn create_stamps_owner_and_pending() {
        let (lifecycle, _) = lifecycle(0);
        let album = lifecycle
            .create("u1", AlbumDraft::new("Lonely Moon", "X"))
            .await
            .unwrap();
        assert_eq!(album.owner.as_str(), "u1");
        assert_eq!(album.status, AlbumStatus::Pending);
    }

    #[tokio::test]
    async fn blank_title_fails_before_identity_or_store() {
        let store = Arc::new(InMemoryAlbumStore::new());
        let mut identity = MockIdentityProvider::new();
        identity.expect_resolve_caller_id().never();
        let lifecycle = lifecycle_with(
            store.clone(),
            identity,
            MockBlobStorage::new(),
            MockMetadataLookup::new(),
        );

        let err = lifecycle.create("u1", AlbumDraft::new(" ", "X")).await.unwrap_err();
        assert!(matches!(err, OtakuyError::Validation(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn invalid_credential_is_auth_error() {
        let (lifecycle, _) = lifecycle(0);
        let err = lifecycle
            .create("", AlbumDraft::new("Lonely Moon", "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, OtakuyError::Auth(_)));
    }

    #[tokio::test]
    async fn get_strips_resource_for_low_star_stranger() {
        let (lifecycle, _) = lifecycle(1);
        let album = lifecycle.create("u1", gated_draft("a", 3)).await.unwrap();

        let seen_by_stranger = lifecycle.get("u2", &album.id).await.unwrap();
        assert!(seen_by_stranger.download_res.is_none());

        let seen_by_owner = lifecycle.get("u1", &album.id).await.unwrap();
        assert!(seen_by_owner.download_res.is_some());
    }

    #[tokio::test]
    async fn get_reveals_resource_to_entitled_stranger() {
        let (lifecycle, _) = lifecycle(5);
        let album = lifecycle.create("u1", gated_draft("a", 3)).await.unwrap();
        let seen = lifecycle.get("u2", &album.id).await.unwrap();
        assert_eq!(seen.download_res.unwrap().url, "https://pan.example.com/x");
    }

    #[tokio::test]
    async fn get_missing_album_is_not_found() {
        let (lifecycle, _) = lifecycle(0);
        let err = lifecycle.get("u1", &AlbumId::new("nope")).await.unwrap_err();
        assert!(matches!(err, OtakuyError::AlbumNotFound(_)));
    }

    #[tokio::test]
    async fn stranger_cannot_delete_or_edit() {
        let (lifecycle, store) = lifecycle(99);
        let album = lifecycle.create("u1", AlbumDraft::new("a", "X")).await.unwrap();

        let err = lifecycle.delete("u2", &album.id).await.unwrap_err();
        assert!(matches!(err, OtakuyError::PermissionDenied(_)));

        let err = lifecycle
            .update("u2", &album.id, AlbumDraft::new("b", "Y"))
            .await
            .unwrap_err();
        assert!(matches!(err, OtakuyError::PermissionDenied(_)));

        assert_eq!(store.get(&album.id).await.unwrap(), Some(album));
    }

    #[tokio::test]
    async fn owner_cannot_edit_active_album_but_moderator_can() {
        let (lifecycle, _) = lifecycle(0);
        let album = lifecycle.create("u1", AlbumDraft::new("a", "X")).await.unwrap();
        lifecycle
            .moderate("mod", BTreeSet::from([album.id.clone()]), AlbumStatus::Active)
            .await
            .unwrap();

        let err = lifecycle
            .update("u1", &album.id, AlbumDraft::new("a", "Y"))
            .await
            .unwrap_err();
        assert!(matches!(err, OtakuyError::PermissionDenied(_)));

        let edited = lifecycle
            .update("mod", &album.id, AlbumDraft::new("a", "Y"))
            .await
            .unwrap();
        assert_eq!(edited.artist, "Y");
        assert_eq!(edited.status, AlbumStatus::Active);
        assert_eq!(edited.owner.as_str(), "u1");
    }

    #[tokio::test]
    async fn owner_cannot_replace_cover_of_active_album() {
        let store = Arc::new(InMemoryAlbumStore::new());
        let mut blobs = MockBlobStorage::new();
        blobs
            .expect_store()
            .times(1)
            .returning(|_, key| Ok(format!("https://cover.example.com/{key}")));
        let lifecycle = lifecycle_with(store.clone(), identity(0), blobs, MockMetadataLookup::new());
        let album = lifecycle.create("u1", AlbumDraft::new("a", "X")).await.unwrap();
        lifecycle
            .moderate("mod", BTreeSet::from([album.id.clone()]), AlbumStatus::Active)
            .await
            .unwrap();

        let err = lifecycle
            .upload_cover("u1", &album.id, b"png".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, OtakuyError::PermissionDenied(_)));
        assert!(store.get(&album.id).await.unwrap().unwrap().cover.is_empty());

        let upload = lifecycle
            .upload_cover("mod", &album.id, b"png".to_vec())
            .await
            .unwrap();
        upload.update.wait().await.unwrap();
        assert_eq!(store.get(&album.id).await.unwrap().unwrap().cover, upload.url);
    }

    #[tokio::test]
    async fn non_moderator_cannot_moderate() {
        let (lifecycle, store) = lifecycle(0);
        let album = lifecycle.create("u1", AlbumDraft::new("a", "X")).await.unwrap();

        let err = lifecycle
            .moderate("u1", BTreeSet::from([album.id.clone()]), AlbumStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, OtakuyError::PermissionDenied(_)));
        assert_eq!(
            store.get(&album.id).await.unwrap().unwrap().status,
            AlbumStatus::Pending
        );
    }

    #[tokio::test]
    async fn counts_reflect_moderation() {
        let (lifecycle, _) = lifecycle(0);
        let a = lifecycle.create("u1", AlbumDraft::new("a", "X")).await.unwrap();
        lifecycle.create("u1", AlbumDraft::new("b", "X")).await.unwrap();
        lifecycle
            .moderate("mod", BTreeSet::from([a.id.clone()]), AlbumStatus::Active)
            .await
            .unwrap();
        lifecycle
            .set_recommended("mod", BTreeSet::from([a.id]), true)
            .await
            .unwrap();

        let counts = lifecycle.counts("mod").await.unwrap();
        assert_eq!(
            counts,
            AlbumCounts {
                pending: 1,
                active: 1,
                rejected: 0,
                recommended: 1
            }
        );
    }

    #[tokio::test]
    async fn cover_upload_returns_url_and_updates_record() {
        let store = Arc::new(InMemoryAlbumStore::new());
        let mut blobs = MockBlobStorage::new();
        blobs
            .expect_store()
            .withf(|bytes, key| bytes == b"png" && key.ends_with(".png"))
            .returning(|_, key| Ok(format!("https://cover.example.com/{key}")));
        let lifecycle = lifecycle_with(store.clone(), identity(0), blobs, MockMetadataLookup::new());
        let album = lifecycle.create("u1", AlbumDraft::new("a", "X")).await.unwrap();

        let upload = lifecycle
            .upload_cover("u1", &album.id, b"png".to_vec())
            .await
            .unwrap();
        assert_eq!(upload.url, format!("https://cover.example.com/{}.png", album.id));

        upload.update.wait().await.unwrap();
        let stored = store.get(&album.id).await.unwrap().unwrap();
        assert_eq!(stored.cover, upload.url);
    }

    #[tokio::test]
    async fn cover_storage_failure_is_surfaced() {
        let store = Arc::new(InMemoryAlbumStore::new());
        let mut blobs = MockBlobStorage::new();
        blobs
            .expect_store()
            .returning(|_, _| Err(OtakuyError::upstream("cover storage", "disk full")));
        let lifecycle = lifecycle_with(store.clone(), identity(0), blobs, MockMetadataLookup::new());
        let album = lifecycle.create("u1", AlbumDraft::new("a", "X")).await.unwrap();

        let err = lifecycle
            .upload_cover("u1", &album.id, b"png".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, OtakuyError::Upstream { ref message, .. } if message == "disk full"));
        assert!(store.get(&album.id).await.unwrap().unwrap().cover.is_empty());
    }

    #[tokio::test]
    async fn metadata_failures_propagate_as_upstream() {
        let mut metadata = MockMetadataLookup::new();
        metadata
            .expect_suggest()
            .returning(|_| Err(OtakuyError::upstream("douban", "503 Service Unavailable")));
        let lifecycle = lifecycle_with(
            Arc::new(InMemoryAlbumStore::new()),
            identity(0),
            MockBlobStorage::new(),
            metadata,
        );

        let err = lifecycle.suggest("Lonely Moon").await.unwrap_err();
        assert_eq!(err.to_string(), "douban failed: 503 Service Unavailable");
    }
}
