/// External collaborator traits
///
/// The core calls these but never implements them outside of tests; the
/// server wires in JWT/database identity, filesystem covers and the Douban
/// HTTP client.
use crate::error::Result;
use crate::types::{AlbumDraft, Suggestion, UserId};
use async_trait::async_trait;

/// Identity collaborator
///
/// Implementers turn a credential into a user and report the attributes the
/// permission evaluator needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer credential to the user it was issued for
    ///
    /// # Errors
    /// Returns `OtakuyError::Auth` if the credential is invalid or expired
    async fn resolve_caller_id(&self, credential: &str) -> Result<UserId>;

    /// Current entitlement ("star") level of a user
    async fn entitlement_level(&self, user_id: &UserId) -> Result<u32>;

    /// Whether the user holds the moderator capability
    async fn is_moderator(&self, user_id: &UserId) -> Result<bool>;
}

/// Blob storage collaborator used for album covers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `bytes` under `key` and return the public URL it is served from
    async fn store(&self, bytes: Vec<u8>, key: &str) -> Result<String>;
}

/// External catalog lookup collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Candidate albums matching a title
    async fn suggest(&self, title: &str) -> Result<Vec<Suggestion>>;

    /// Album-shaped record for an external id, ready to prefill a submission
    async fn detail(&self, external_id: &str) -> Result<AlbumDraft>;
}
