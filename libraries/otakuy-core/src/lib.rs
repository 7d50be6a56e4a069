//! Otakuy Music Core
//!
//! Album lifecycle and visibility-control engine for the Otakuy Music catalog.
//!
//! Users submit albums, moderators accept or reject them, and each album may
//! carry a gated download resource that only its owner or sufficiently
//! entitled users ("star" level) may see.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Album`, `AlbumStatus`, `DownloadRes`, `Caller`, ids
//! - **Collaborator Traits**: `AlbumStore`, `IdentityProvider`, `BlobStorage`, `MetadataLookup`
//! - **Components**: `ModerationEngine`, the permission evaluator in [`visibility`],
//!   `CatalogQuery` and the `AlbumLifecycle` orchestrator
//! - **Error Handling**: Unified `OtakuyError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use otakuy_core::types::{Album, AlbumDraft, Caller, DownloadRes, UserId};
//! use otakuy_core::visibility::can_view_gated_resource;
//!
//! let mut draft = AlbumDraft::new("Lonely Moon", "X");
//! draft.download_res = Some(DownloadRes::new("https://pan.example.com/lm", 3));
//! let album = Album::from_draft(draft, UserId::new("u1"));
//!
//! let stranger = Caller::new(UserId::new("u2"), 1);
//! assert!(!can_view_gated_resource(&stranger, &album));
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod moderation;
pub mod storage;
pub mod traits;
pub mod types;
pub mod visibility;

// Re-export commonly used types
pub use catalog::{CatalogQuery, FilterKind, TitleCheck, OWNER_PAGE_SIZE, PUBLIC_PAGE_SIZE};
pub use error::{OtakuyError, Result};
pub use lifecycle::{AlbumCounts, AlbumLifecycle, CoverUpdate, CoverUpload};
pub use memory::InMemoryAlbumStore;
pub use moderation::{ModerationDecision, ModerationEngine};
pub use storage::{AlbumField, AlbumFilter, AlbumStore, Page};
pub use traits::{BlobStorage, IdentityProvider, MetadataLookup};
pub use types::{
    Album, AlbumDraft, AlbumId, AlbumStatus, Caller, DownloadRes, Suggestion, UserId,
};
