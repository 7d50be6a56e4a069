//! Moderation engine
//!
//! Owns the status state machine and the "one live album per title" rule.
//! All transitions are triggered from outside (moderator actions); nothing
//! here runs on a timer.

use crate::error::{OtakuyError, Result};
use crate::storage::{AlbumField, AlbumStore};
use crate::types::{Album, AlbumId, AlbumStatus, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A moderator's status change for a batch of albums
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationDecision {
    pub album_ids: BTreeSet<AlbumId>,
    pub status: AlbumStatus,
    pub actor: UserId,
}

#[derive(Clone)]
pub struct ModerationEngine {
    store: Arc<dyn AlbumStore>,
}

impl ModerationEngine {
    pub fn new(store: Arc<dyn AlbumStore>) -> Self {
        Self { store }
    }

    /// Persist a new album in `pending`
    ///
    /// The duplicate check and the insert are two separate store calls with no
    /// guard between them, so two concurrent creates of one title can both
    /// pass the check.
    pub async fn create(&self, mut candidate: Album) -> Result<Album> {
        if candidate.title.trim().is_empty() {
            return Err(OtakuyError::validation("Album title must not be blank"));
        }

        if !self
            .store
            .find_by_title_active_or_pending(&candidate.title)
            .await?
            .is_empty()
        {
            return Err(OtakuyError::DuplicateTitle(candidate.title));
        }

        candidate.status = AlbumStatus::Pending;
        let album = self.store.save(candidate).await?;
        tracing::info!(album_id = %album.id, owner = %album.owner, "Album submitted for moderation");
        Ok(album)
    }

    /// Write back an edited album
    ///
    /// A changed title on a pending or active album is checked against other
    /// live albums again; the album itself never counts as a duplicate.
    pub async fn update(&self, album: Album, previous_title: &str) -> Result<Album> {
        if album.title != previous_title && album.status.reserves_title() {
            let clash = self
                .store
                .find_by_title_active_or_pending(&album.title)
                .await?
                .into_iter()
                .any(|other| other.id != album.id);
            if clash {
                return Err(OtakuyError::DuplicateTitle(album.title));
            }
        }

        self.store.save(album).await
    }

    /// Bulk status change; unknown ids are skipped
    ///
    /// Returns the number of albums whose status actually changed.
    pub async fn apply_status(&self, ids: &BTreeSet<AlbumId>, status: AlbumStatus) -> Result<u64> {
        self.store
            .bulk_set_field(ids, AlbumField::Status(status))
            .await
    }

    /// Apply a moderator decision and record who made it
    pub async fn apply(&self, decision: &ModerationDecision) -> Result<u64> {
        let modified = self
            .apply_status(&decision.album_ids, decision.status)
            .await?;
        tracing::info!(
            actor = %decision.actor,
            status = %decision.status,
            requested = decision.album_ids.len(),
            modified,
            "Moderation decision applied"
        );
        Ok(modified)
    }

    /// Bulk recommend-flag toggle, same shape as [`Self::apply_status`]
    pub async fn set_recommended(&self, ids: &BTreeSet<AlbumId>, flag: bool) -> Result<u64> {
        self.store
            .bulk_set_field(ids, AlbumField::Recommend(flag))
            .await
    }

    /// Remove an album regardless of its status
    pub async fn delete(&self, album: &Album) -> Result<()> {
        if self.store.delete(album).await? {
            tracing::info!(album_id = %album.id, "Album deleted");
            Ok(())
        } else {
            Err(OtakuyError::AlbumNotFound(album.id.clone()))
        }
    }
}
