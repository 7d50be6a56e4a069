/// Identity collaborator backed by JWT access tokens and the users table
use crate::services::AuthService;
use async_trait::async_trait;
use otakuy_core::{IdentityProvider, OtakuyError, Result, UserId};
use otakuy_storage::{users, UserRecord};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Resolves bearer tokens and reads star level and moderator flag fresh from
/// the database on every call
#[derive(Clone)]
pub struct StoreIdentity {
    pool: SqlitePool,
    auth: Arc<AuthService>,
}

impl StoreIdentity {
    pub fn new(pool: SqlitePool, auth: Arc<AuthService>) -> Self {
        Self { pool, auth }
    }

    async fn user(&self, user_id: &UserId) -> Result<UserRecord> {
        users::get_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| OtakuyError::auth(format!("Unknown user {user_id}")))
    }
}

#[async_trait]
impl IdentityProvider for StoreIdentity {
    async fn resolve_caller_id(&self, credential: &str) -> Result<UserId> {
        let user_id = self.auth.verify_access_token(credential).map_err(|e| {
            tracing::debug!("Rejected credential: {}", e);
            OtakuyError::auth("Invalid or expired token")
        })?;

        // Tokens outlive deleted accounts
        self.user(&user_id).await.map(|user| user.id)
    }

    async fn entitlement_level(&self, user_id: &UserId) -> Result<u32> {
        Ok(self.user(user_id).await?.star)
    }

    async fn is_moderator(&self, user_id: &UserId) -> Result<bool> {
        Ok(self.user(user_id).await?.is_moderator)
    }
}
