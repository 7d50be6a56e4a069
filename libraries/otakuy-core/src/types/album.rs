//! Album types

use super::{AlbumId, UserId};
use crate::error::{OtakuyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Moderation status of an album
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumStatus {
    /// Submitted, waiting for a moderator
    Pending,
    /// Accepted and publicly listed
    Active,
    /// Refused by a moderator
    Rejected,
}

impl AlbumStatus {
    pub const ALL: [AlbumStatus; 3] = [Self::Pending, Self::Active, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
        }
    }

    /// Whether an album in this status holds its title against new submissions
    pub fn reserves_title(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl fmt::Display for AlbumStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlbumStatus {
    type Err = OtakuyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "rejected" => Ok(Self::Rejected),
            other => Err(OtakuyError::validation(format!(
                "Unknown album status: {other}"
            ))),
        }
    }
}

/// Gated download resource attached to an album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRes {
    pub url: String,
    /// Minimum star level required to see `url`
    pub permission: u32,
}

impl DownloadRes {
    pub fn new(url: impl Into<String>, permission: u32) -> Self {
        Self {
            url: url.into(),
            permission,
        }
    }
}

/// A moderated catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist: String,
    pub tags: BTreeSet<String>,
    /// Cover URL, empty until one is uploaded
    pub cover: String,
    pub intro: String,
    pub status: AlbumStatus,
    pub owner: UserId,
    pub is_recommend: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_res: Option<DownloadRes>,
    pub created_at: DateTime<Utc>,
}

impl Album {
    /// Build a new pending album owned by `owner` from submitted data
    pub fn from_draft(draft: AlbumDraft, owner: UserId) -> Self {
        Self {
            id: AlbumId::generate(),
            title: draft.title.trim().to_string(),
            artist: draft.artist.trim().to_string(),
            tags: draft.tags,
            cover: draft.cover.unwrap_or_default(),
            intro: draft.intro,
            status: AlbumStatus::Pending,
            owner,
            is_recommend: false,
            download_res: draft.download_res,
            created_at: Utc::now(),
        }
    }
}

/// User-submitted album data, used for creation and edits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumDraft {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub download_res: Option<DownloadRes>,
}

impl AlbumDraft {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            ..Self::default()
        }
    }

    /// Check the draft is well formed
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(OtakuyError::validation("Album title must not be blank"));
        }
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(OtakuyError::validation("Tags must not be blank"));
        }
        if let Some(res) = &self.download_res {
            if res.url.trim().is_empty() {
                return Err(OtakuyError::validation(
                    "Download resource URL must not be blank",
                ));
            }
        }
        Ok(())
    }
}
