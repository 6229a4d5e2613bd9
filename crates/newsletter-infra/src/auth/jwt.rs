//! HS256 session tokens carrying the user's capability codes.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use newsletter_core::access::{AuthenticatedUser, CapabilitySet};
use newsletter_core::ports::{AuthError, TokenClaims, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.into(),
            expiration_hours: 24,
            issuer: "newsletter".into(),
        }
    }
}

impl JwtConfig {
    /// Reads `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`, keeping
    /// the defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.secret = secret;
        }
        if let Some(hours) = std::env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            config.expiration_hours = hours;
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            config.issuer = issuer;
        }

        if config.uses_default_secret() {
            tracing::warn!("JWT_SECRET is not set; tokens are signed with the built-in secret");
        }
        config
    }

    fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    name: String,
    caps: Vec<String>,
    iss: String,
    iat: i64,
    exp: i64,
}

impl Claims {
    fn issue(user: &AuthenticatedUser, config: &JwtConfig) -> Self {
        let issued = Utc::now();
        let expires = issued + TimeDelta::hours(config.expiration_hours);
        Self {
            sub: user.id,
            name: user.username.clone(),
            caps: user.capabilities.iter().map(|c| c.code().to_owned()).collect(),
            iss: config.issuer.clone(),
            iat: issued.timestamp(),
            exp: expires.timestamp(),
        }
    }
}

impl From<Claims> for TokenClaims {
    fn from(claims: Claims) -> Self {
        TokenClaims {
            user_id: claims.sub,
            username: claims.name,
            capabilities: CapabilitySet::parse_codes(&claims.caps.join(",")),
            exp: claims.exp,
        }
    }
}

pub struct JwtTokenService {
    keys: (EncodingKey, DecodingKey),
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        let mut validation = Validation::default();
        validation.set_issuer(&[config.issuer.as_str()]);

        Self {
            keys: (
                EncodingKey::from_secret(secret),
                DecodingKey::from_secret(secret),
            ),
            validation,
            config,
        }
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, user: &AuthenticatedUser) -> Result<String, AuthError> {
        let claims = Claims::issue(user, &self.config);
        jsonwebtoken::encode(&Header::default(), &claims, &self.keys.0)
            .map_err(|err| AuthError::InvalidToken(err.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        match jsonwebtoken::decode::<Claims>(token, &self.keys.1, &self.validation) {
            Ok(data) => Ok(data.claims.into()),
            Err(err) if matches!(err.kind(), ErrorKind::ExpiredSignature) => {
                Err(AuthError::TokenExpired)
            }
            Err(err) => Err(AuthError::InvalidToken(err.to_string())),
        }
    }

    fn expiration_seconds(&self) -> i64 {
        TimeDelta::hours(self.config.expiration_hours).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsletter_core::access::Capability;

    fn service(issuer: &str, expiration_hours: i64) -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: "not-so-secret".into(),
            expiration_hours,
            issuer: issuer.into(),
        })
    }

    fn toto(capabilities: &[Capability]) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "toto".into(),
            capabilities: capabilities.iter().copied().collect(),
        }
    }

    #[test]
    fn test_token_carries_identity_and_capabilities() {
        let tokens = service("newsletter", 1);
        let user = toto(&[Capability::CreatePost, Capability::ChangeComment]);

        let claims = tokens
            .validate_token(&tokens.generate_token(&user).unwrap())
            .unwrap();

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.username, "toto");
        assert_eq!(claims.capabilities, user.capabilities);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = service("newsletter", 1).validate_token("not.a.token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let token = service("elsewhere", 1).generate_token(&toto(&[])).unwrap();
        assert!(service("newsletter", 1).validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        // Well past the default 60s leeway.
        let token = service("newsletter", -1).generate_token(&toto(&[])).unwrap();
        let result = service("newsletter", 1).validate_token(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_lifetime_is_reported_in_seconds() {
        assert_eq!(service("newsletter", 24).expiration_seconds(), 86_400);
    }
}
