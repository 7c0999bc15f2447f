//! JWT issuance and validation.

use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::UserRole;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::server::{
    config::Config,
    error::{auth::AuthError, AppError},
};

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID as a string
    pub sub: String,
    pub role: UserRole,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i32, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Signs and verifies HS256 tokens with the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self::with_secret(
            &config.jwt_secret_key,
            Duration::minutes(config.access_token_expire_minutes),
            Duration::days(config.refresh_token_expire_days),
        )
    }

    pub fn with_secret(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Lifetime of access tokens in seconds, reported to clients as `expires_in`.
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Signs a token for a user.
    ///
    /// # Arguments
    /// - `user_id` - Subject of the token
    /// - `role` - Role at issue time, informational for clients
    /// - `kind` - Access or refresh
    ///
    /// # Returns
    /// - `Ok(String)` - Encoded JWT
    /// - `Err(AppError::InternalError)` - Signing failed
    pub fn issue(&self, user_id: i32, role: UserRole, kind: TokenKind) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalError(format!("Failed to sign token: {}", e)))
    }

    /// Validates a token's signature, expiry, and kind.
    ///
    /// # Returns
    /// - `Ok(Claims)` - Token is valid and of the expected kind
    /// - `Err(AuthError::InvalidToken)` - Bad signature, expired, or wrong kind
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })?;

        if data.claims.kind != expected {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::with_secret("test-secret", Duration::minutes(30), Duration::days(7))
    }

    /// Expected: an issued access token verifies and carries the user ID
    #[test]
    fn access_token_verifies() {
        let tokens = service();
        let token = tokens.issue(42, UserRole::Driver, TokenKind::Access).unwrap();

        let claims = tokens.verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, UserRole::Driver);
    }

    /// Expected: a refresh token is not accepted where an access token is required
    #[test]
    fn rejects_wrong_kind() {
        let tokens = service();
        let token = tokens.issue(1, UserRole::Passenger, TokenKind::Refresh).unwrap();

        assert!(matches!(
            tokens.verify(&token, TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
    }

    /// Expected: tokens signed with another secret are rejected
    #[test]
    fn rejects_foreign_signature() {
        let other = TokenService::with_secret("other", Duration::minutes(30), Duration::days(7));
        let token = other.issue(1, UserRole::Passenger, TokenKind::Access).unwrap();

        assert!(service().verify(&token, TokenKind::Access).is_err());
    }

    /// Expected: expired tokens are rejected
    #[test]
    fn rejects_expired_token() {
        let tokens =
            TokenService::with_secret("test-secret", Duration::minutes(-10), Duration::days(7));
        let token = tokens.issue(1, UserRole::Passenger, TokenKind::Access).unwrap();

        assert!(tokens.verify(&token, TokenKind::Access).is_err());
    }
}
