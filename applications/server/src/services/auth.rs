/// Token issuing and password hashing
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use otakuy_core::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Tokens handed out on login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl AuthService {
    /// Fails with `ServerError::Config` when a lifetime is out of range
    pub fn new(secret: String, access_ttl_hours: u64, refresh_ttl_days: u64) -> Result<Self> {
        let access_token_ttl = i64::try_from(access_ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                ServerError::Config(format!("Access token lifetime out of range: {access_ttl_hours}h"))
            })?;
        let refresh_token_ttl = i64::try_from(refresh_ttl_days)
            .ok()
            .and_then(Duration::try_days)
            .ok_or_else(|| {
                ServerError::Config(format!("Refresh token lifetime out of range: {refresh_ttl_days}d"))
            })?;

        Ok(Self {
            secret,
            access_token_ttl,
            refresh_token_ttl,
        })
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(ServerError::from)
    }

    /// Verify a password against a bcrypt hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(ServerError::from)
    }

    /// Access and refresh token for a freshly authenticated user
    pub fn issue_tokens(&self, user_id: &UserId) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.create_access_token(user_id)?,
            refresh_token: self.sign(user_id, TokenType::Refresh, self.refresh_token_ttl)?,
            token_type: "Bearer",
        })
    }

    pub fn create_access_token(&self, user_id: &UserId) -> Result<String> {
        self.sign(user_id, TokenType::Access, self.access_token_ttl)
    }

    /// Verify signature and expiry and check the token is of `expected` type
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<UserId> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let claims = decode::<Claims>(token, &decoding_key, &Validation::default())?.claims;

        if claims.token_type != expected {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        Ok(UserId::new(claims.sub))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        self.verify(token, TokenType::Access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<UserId> {
        self.verify(token, TokenType::Refresh)
    }

    fn sign(&self, user_id: &UserId, token_type: TokenType, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| ServerError::Config("Token lifetime overflows the calendar".to_string()))?;
        let claims = Claims {
            sub: user_id.as_str().to_string(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
            token_type,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_pair_verifies_by_type() {
        let auth = AuthService::new("secret".to_string(), 24, 30).unwrap();
        let user_id = UserId::new("user-123");

        let pair = auth.issue_tokens(&user_id).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(auth.verify_access_token(&pair.access_token).unwrap(), user_id);
        assert_eq!(auth.verify_refresh_token(&pair.refresh_token).unwrap(), user_id);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let auth = AuthService::new("secret".to_string(), 24, 30).unwrap();
        let pair = auth.issue_tokens(&UserId::new("user-123")).unwrap();

        assert!(matches!(
            auth.verify_refresh_token(&pair.access_token),
            Err(ServerError::Auth(_))
        ));
        assert!(auth.verify_access_token(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_out_of_range_lifetimes_are_config_errors() {
        assert!(matches!(
            AuthService::new("secret".to_string(), u64::MAX, 30),
            Err(ServerError::Config(_))
        ));
        assert!(matches!(
            AuthService::new("secret".to_string(), 24, i64::MAX as u64),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_lifetime_past_calendar_end_fails_to_sign() {
        let auth = AuthService::new("secret".to_string(), 1, 100_000_000).unwrap();
        assert!(matches!(
            auth.issue_tokens(&UserId::new("user-123")),
            Err(ServerError::Config(_))
        ));
    }
}
