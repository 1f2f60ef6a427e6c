//! Authentication manager
//!
//! Owns the signing secret and cookie policy. Registers and authenticates
//! users, issues tokens and resolves the caller's identity from a request.

use axum::http::{HeaderMap, header};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

use super::identity::{Identity, project};
use super::jwt::{JwtError, TokenClaims, create_token, validate_token};
use super::password::{PasswordError, hash_password, verify_password};
use crate::api::types::ApiError;
use crate::core::config::{AuthConfig, Environment};
use crate::core::constants::{TOKEN_COOKIE_NAME, TOKEN_TTL_HOURS};
use crate::data::sqlite::SqliteError;
use crate::data::sqlite::repositories as repo;

/// Authentication failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No token provided")]
    NoToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Access token not found or invalid")]
    MissingIdentity,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Password hashing failed: {0}")]
    Password(#[from] PasswordError),

    #[error("Token signing failed: {0}")]
    Signing(JwtError),

    #[error(transparent)]
    Storage(#[from] SqliteError),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DuplicateEmail | AuthError::InvalidCredentials => {
                ApiError::bad_request(e.to_string())
            }
            AuthError::NoToken
            | AuthError::InvalidToken
            | AuthError::MissingIdentity
            | AuthError::AdminRequired => ApiError::unauthorized(e.to_string()),
            AuthError::Storage(e) => ApiError::from_sqlite(e),
            AuthError::Password(_) | AuthError::Signing(_) => {
                tracing::error!(error = %e, "Authentication internal error");
                ApiError::internal("Authentication failed")
            }
        }
    }
}

/// Pull the raw token from a request: the `jwt` cookie first, then the
/// second whitespace-separated part of the `Authorization` header.
pub fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(TOKEN_COOKIE_NAME)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().nth(1))
        .map(str::to_string)
}

/// Main authentication manager
pub struct AuthManager {
    signing_key: Vec<u8>,
    secure_cookies: bool,
    pool: SqlitePool,
}

impl AuthManager {
    pub fn new(config: &AuthConfig, environment: Environment, pool: SqlitePool) -> Self {
        tracing::debug!(
            secure_cookies = environment.is_production(),
            "Authentication manager initialized"
        );
        Self {
            signing_key: config.jwt_secret.as_bytes().to_vec(),
            secure_cookies: environment.is_production(),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a user with the default role and return its identity
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let password_hash = hash_password(password.to_string()).await?;

        let record = repo::create_user(&self.pool, name, email, &password_hash)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AuthError::DuplicateEmail
                } else {
                    AuthError::Storage(e)
                }
            })?;

        tracing::info!(user_id = record.user.id, "User registered");
        Ok(project(&record))
    }

    /// Check an email/password pair. Unknown email and wrong password both yield `None`.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, AuthError> {
        let Some(record) = repo::get_by_email(&self.pool, email).await? else {
            tracing::debug!("Login attempt for unknown email");
            return Ok(None);
        };

        let verified =
            match verify_password(password.to_string(), record.user.password_hash.clone()).await {
                Ok(verified) => verified,
                Err(PasswordError::Bcrypt(e)) => {
                    tracing::warn!(
                        user_id = record.user.id,
                        error = %e,
                        "Stored password hash is unreadable"
                    );
                    false
                }
                Err(e) => return Err(e.into()),
            };

        if !verified {
            tracing::debug!(user_id = record.user.id, "Login attempt with wrong password");
            return Ok(None);
        }

        Ok(Some(project(&record)))
    }

    /// Sign a token for the identity, valid from now
    pub fn issue_token(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_token_at(identity, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`
    pub fn issue_token_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims::new(identity.clone(), issued_at);
        create_token(&self.signing_key, &claims).map_err(AuthError::Signing)
    }

    /// Verify a token's signature and expiry and return the embedded identity
    pub fn verify_token(&self, token: &str) -> Result<Identity, JwtError> {
        validate_token(token, &self.signing_key).map(|claims| claims.identity)
    }

    /// Resolve the caller's identity from the request.
    ///
    /// | token    | optional | result                |
    /// |----------|----------|-----------------------|
    /// | absent   | true     | `Ok(None)`            |
    /// | absent   | false    | `Err(NoToken)`        |
    /// | invalid  | true     | `Ok(None)`            |
    /// | invalid  | false    | `Err(InvalidToken)`   |
    /// | valid    | any      | `Ok(Some(identity))`  |
    pub fn resolve_identity(
        &self,
        jar: &CookieJar,
        headers: &HeaderMap,
        optional: bool,
    ) -> Result<Option<Identity>, AuthError> {
        let Some(token) = extract_token(jar, headers) else {
            return if optional {
                Ok(None)
            } else {
                Err(AuthError::NoToken)
            };
        };

        match self.verify_token(&token) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                tracing::debug!(error = %e, optional, "Token verification failed");
                if optional {
                    Ok(None)
                } else {
                    Err(AuthError::InvalidToken)
                }
            }
        }
    }

    /// Cookie carrying a freshly issued token
    pub fn token_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE_NAME, token))
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(time::Duration::hours(TOKEN_TTL_HOURS))
            .build()
    }

    /// Add a removal cookie for the token, whether or not the request carried one
    pub fn clear_token(&self, jar: CookieJar) -> CookieJar {
        let mut cookie = Cookie::build((TOKEN_COOKIE_NAME, ""))
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Strict)
            .path("/")
            .build();
        cookie.make_removal();
        jar.add(cookie)
    }
}
