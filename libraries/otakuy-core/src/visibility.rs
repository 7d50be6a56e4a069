//! Visibility and edit-authority predicates
//!
//! Both checks are pure functions of the caller and the album. Looking up the
//! caller's current star level or moderator flag is the caller's job.

use crate::error::{OtakuyError, Result};
use crate::types::{Album, AlbumStatus, Caller};

/// Whether `caller` may see the album's gated download resource
///
/// True for the owner, or when the caller's star level reaches the resource's
/// required permission. An album without a resource has nothing to gate and
/// yields true; use [`redact_for`] to build payloads so that absence stays
/// "nothing to show".
pub fn can_view_gated_resource(caller: &Caller, album: &Album) -> bool {
    if caller.id == album.owner {
        return true;
    }
    match &album.download_res {
        Some(res) => caller.star >= res.permission,
        None => true,
    }
}

/// Album payload as `caller` is allowed to see it
///
/// The whole resource is dropped when the caller is not admitted.
pub fn redact_for(caller: &Caller, mut album: Album) -> Album {
    if !can_view_gated_resource(caller, &album) {
        album.download_res = None;
    }
    album
}

/// Album payload for listings, which never carry the gated resource
pub fn withhold_gated_resource(mut album: Album) -> Album {
    album.download_res = None;
    album
}

/// Outcome of an edit-authority check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    Allowed,
    Denied,
}

/// Whether `caller` may edit or delete `album`
pub fn check_authority(caller: &Caller, album: &Album) -> Authority {
    if caller.id == album.owner || caller.is_moderator {
        Authority::Allowed
    } else {
        Authority::Denied
    }
}

/// [`check_authority`] as a hard failure
pub fn require_authority(caller: &Caller, album: &Album) -> Result<()> {
    match check_authority(caller, album) {
        Authority::Allowed => Ok(()),
        Authority::Denied => Err(OtakuyError::permission_denied(format!(
            "user {} may not modify album {}",
            caller.id, album.id
        ))),
    }
}

/// Content edits: authority, plus owners are locked out of active albums
pub fn require_editable(caller: &Caller, album: &Album) -> Result<()> {
    require_authority(caller, album)?;
    if album.status == AlbumStatus::Active && !caller.is_moderator {
        return Err(OtakuyError::permission_denied(format!(
            "album {} is active and locked for editing",
            album.id
        )));
    }
    Ok(())
}

/// Moderation-only operations
pub fn require_moderator(caller: &Caller) -> Result<()> {
    if caller.is_moderator {
        Ok(())
    } else {
        Err(OtakuyError::permission_denied(format!(
            "user {} is not a moderator",
            caller.id
        )))
    }
}
