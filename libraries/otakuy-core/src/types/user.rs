/// Caller domain type
use super::UserId;
use serde::{Deserialize, Serialize};

/// The resolved identity behind a request
///
/// Users themselves live with the identity collaborator; the core only reads
/// the attributes it needs to make permission decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: UserId,

    /// Entitlement level compared against `DownloadRes::permission`
    pub star: u32,

    /// Moderators may act on albums they do not own
    pub is_moderator: bool,
}

impl Caller {
    pub fn new(id: UserId, star: u32) -> Self {
        Self {
            id,
            star,
            is_moderator: false,
        }
    }

    pub fn moderator(id: UserId, star: u32) -> Self {
        Self {
            id,
            star,
            is_moderator: true,
        }
    }
}
