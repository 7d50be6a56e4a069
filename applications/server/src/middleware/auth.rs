/// Authentication middleware
use crate::{error::ServerError, services::AuthService};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Verified bearer token of the current request
///
/// The raw token is kept because the album core resolves callers from the
/// credential itself.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    token: String,
}

impl AuthenticatedUser {
    pub fn credential(&self) -> &str {
        &self.token
    }
}

/// Middleware that extracts and validates JWT from Authorization header
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    let user_id = auth_service.verify_access_token(&token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    tracing::debug!(user_id = %user_id, "Request authenticated");
    request
        .extensions_mut()
        .insert(AuthenticatedUser { token });

    Ok(next.run(request).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("Not authenticated".to_string()))
    }
}
