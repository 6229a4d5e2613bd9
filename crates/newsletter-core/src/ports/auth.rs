//! Credentials and access tokens.

use uuid::Uuid;

use crate::access::{AuthenticatedUser, CapabilitySet};

/// What a valid access token asserts about its bearer.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    pub capabilities: CapabilitySet,
    /// Unix seconds.
    pub exp: i64,
}

impl From<TokenClaims> for AuthenticatedUser {
    fn from(claims: TokenClaims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            capabilities: claims.capabilities,
        }
    }
}

/// Issues and checks access tokens.
pub trait TokenService: Send + Sync {
    fn generate_token(&self, user: &AuthenticatedUser) -> Result<String, AuthError>;

    /// Expired tokens fail with [`AuthError::TokenExpired`].
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of a freshly issued token, in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// One-way password hashing.
pub trait PasswordService: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` for a wrong password; `Err` only for an unreadable hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
