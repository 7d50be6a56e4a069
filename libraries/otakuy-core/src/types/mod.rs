mod album;
mod ids;
mod metadata;
mod user;

pub use album::{Album, AlbumDraft, AlbumStatus, DownloadRes};
pub use ids::{AlbumId, UserId};
pub use metadata::Suggestion;
pub use user::Caller;
