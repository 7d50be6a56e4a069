/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into a domain type
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}

impl From<StorageError> for otakuy_core::OtakuyError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Database(e) => otakuy_core::OtakuyError::Database(e.to_string()),
            other => otakuy_core::OtakuyError::storage(other.to_string()),
        }
    }
}
