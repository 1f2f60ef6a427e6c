//! JWT access token handling

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::identity::Identity;
use crate::core::constants::TOKEN_TTL_HOURS;

/// JWT validation error
#[derive(Debug)]
pub enum JwtError {
    /// Token has expired
    Expired,
    /// Token signature is invalid
    InvalidSignature,
    /// Other encoding or validation error
    Invalid(String),
}

impl fmt::Display for JwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "Access token has expired"),
            Self::InvalidSignature => write!(f, "Invalid access token signature"),
            Self::Invalid(msg) => write!(f, "Invalid access token: {}", msg),
        }
    }
}

impl std::error::Error for JwtError {}

/// JWT claims: the caller's identity plus issue/expiry times
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub identity: Identity,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(identity: Identity, issued_at: DateTime<Utc>) -> Self {
        let exp = issued_at + Duration::hours(TOKEN_TTL_HOURS);

        Self {
            identity,
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// Create a signed HS256 access token
pub fn create_token(signing_key: &[u8], claims: &TokenClaims) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|e| JwtError::Invalid(e.to_string()))
}

/// Validate and decode an access token
pub fn validate_token(token: &str, signing_key: &[u8]) -> Result<TokenClaims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<TokenClaims>(token, &DecodingKey::from_secret(signing_key), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::Invalid(e.to_string()),
        })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::identity::Profile;

    fn test_key() -> Vec<u8> {
        vec![0u8; 32]
    }

    fn identity() -> Identity {
        Identity {
            id: 1,
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            user_roles: vec!["general".to_string()],
            profile: Profile {
                avatar_path: "default_avatar.png".to_string(),
            },
        }
    }

    #[test]
    fn test_create_and_validate() {
        let key = test_key();
        let claims = TokenClaims::new(identity(), Utc::now());
        let token = create_token(&key, &claims).unwrap();

        let decoded = validate_token(&token, &key).unwrap();
        assert_eq!(decoded.identity, identity());
        assert_eq!(decoded.exp - decoded.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_claims_are_flat() {
        let claims = TokenClaims::new(identity(), Utc::now());
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["email"], "test@example.com");
        assert_eq!(value["userRoles"][0], "general");
        assert!(value.get("identity").is_none());
        assert!(value.get("exp").is_some());
    }

    #[test]
    fn test_invalid_signature() {
        let key1 = vec![0u8; 32];
        let key2 = vec![1u8; 32];
        let token = create_token(&key1, &TokenClaims::new(identity(), Utc::now())).unwrap();
        assert!(matches!(
            validate_token(&token, &key2),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let key = test_key();
        let issued_at = Utc::now() - Duration::hours(TOKEN_TTL_HOURS + 1);
        let token = create_token(&key, &TokenClaims::new(identity(), issued_at)).unwrap();
        assert!(matches!(validate_token(&token, &key), Err(JwtError::Expired)));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            validate_token("not-a-jwt", &test_key()),
            Err(JwtError::Invalid(_))
        ));
    }
}
