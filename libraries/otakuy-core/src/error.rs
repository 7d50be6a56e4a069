/// Core error types for Otakuy Music
use crate::types::AlbumId;
use thiserror::Error;

/// Result type alias using `OtakuyError`
pub type Result<T> = std::result::Result<T, OtakuyError>;

/// Core error type for Otakuy Music
#[derive(Error, Debug)]
pub enum OtakuyError {
    /// Malformed input, rejected before any store access
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A pending or active album already uses this title
    #[error("An active or pending album titled {0:?} already exists")]
    DuplicateTitle(String),

    /// Album not found
    #[error("Album not found: {0}")]
    AlbumNotFound(AlbumId),

    /// Caller lacks edit/delete/moderation authority
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Credential could not be resolved to a user
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An external collaborator failed; carries the upstream's own message
    #[error("{service} failed: {message}")]
    Upstream { service: String, message: String },

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OtakuyError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create an upstream collaborator error
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True for errors caused by the caller's request rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::DuplicateTitle(_)
                | Self::AlbumNotFound(_)
                | Self::PermissionDenied(_)
                | Self::Auth(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_keeps_upstream_message() {
        let err = OtakuyError::upstream("douban", "rate limit exceeded");
        assert_eq!(err.to_string(), "douban failed: rate limit exceeded");
        assert!(!err.is_client_error());
    }

    #[test]
    fn duplicate_title_is_client_error() {
        assert!(OtakuyError::DuplicateTitle("Lonely Moon".into()).is_client_error());
        assert!(!OtakuyError::storage("disk full").is_client_error());
    }
}
