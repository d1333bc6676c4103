//! Bearer-token authentication
//!
//! Turns an `Authorization: Bearer <jwt>` header into a [`Principal`].
//! Tokens are HS256 JWTs carrying the account id, username and role.

use crate::config::AuthConfig;
use crate::core::entity::User;
use crate::core::principal::{Principal, Role};
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("failed to issue token: {0}")]
    Issue(String),
}

/// Claims carried by every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id, as a decimal string
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Verifies bearer credentials and issues new ones
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve a raw token to the principal it was issued for
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;

    /// Issue a token for a freshly authenticated account
    fn issue(&self, user: &User) -> Result<String, AuthError>;
}

/// HS256 JWT provider backed by a shared secret
pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_hours: i64,
}

impl JwtAuthProvider {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl_hours,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_hours)
    }

    fn claims_for(&self, user: &User) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            iat: now,
            exp: now + self.ttl_hours * 3600,
        }
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AuthError::InvalidToken
        })?;

        let id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken)?;
        let role = Role::parse_lenient(&data.claims.role).ok_or(AuthError::InvalidToken)?;

        Ok(Principal::new(id, role))
    }

    fn issue(&self, user: &User) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            &self.claims_for(user),
            &self.encoding,
        )
        .map_err(|e| AuthError::Issue(e.to_string()))
    }
}

/// Extract the token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MissingToken)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Access requirement for read-only routes
///
/// Mutations go through [`AccessPolicy`](crate::core::policy::AccessPolicy);
/// reads only need to know who may look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Any authenticated principal
    Authenticated,

    /// Administrators only
    AdminOnly,
}

impl AuthPolicy {
    pub fn check(&self, principal: &Principal) -> bool {
        match self {
            AuthPolicy::Authenticated => true,
            AuthPolicy::AdminOnly => principal.is_admin(),
        }
    }
}
