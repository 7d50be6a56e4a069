/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use otakuy_core::OtakuyError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Errors raised by the album core, mapped per kind
    #[error(transparent)]
    Core(#[from] OtakuyError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl From<otakuy_storage::StorageError> for ServerError {
    fn from(err: otakuy_storage::StorageError) -> Self {
        ServerError::Core(err.into())
    }
}

impl ServerError {
    fn core_response(err: OtakuyError) -> (StatusCode, String) {
        match err {
            OtakuyError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            err @ OtakuyError::DuplicateTitle(_) => (StatusCode::CONFLICT, err.to_string()),
            err @ OtakuyError::AlbumNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            OtakuyError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, msg),
            OtakuyError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            err @ OtakuyError::Upstream { .. } => {
                tracing::warn!("Upstream error: {}", err);
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            err @ (OtakuyError::Storage(_) | OtakuyError::Database(_)) => {
                tracing::error!("Storage error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                )
            }
            err => {
                tracing::error!("Internal error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::Core(err) => Self::core_response(err),
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Jwt(ref e) => {
                tracing::warn!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            ServerError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Password error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otakuy_core::AlbumId;

    fn status_of(err: impl Into<ServerError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_core_errors_map_to_http_status() {
        assert_eq!(status_of(OtakuyError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(OtakuyError::DuplicateTitle("Lonely Moon".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(OtakuyError::AlbumNotFound(AlbumId::new("a"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(OtakuyError::permission_denied("no")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(OtakuyError::auth("expired")), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(OtakuyError::upstream("douban", "503")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(OtakuyError::Database("locked".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
