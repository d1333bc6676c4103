//! Axum extractors for the authenticated principal and entity ids
//!
//! Handlers that take an [`AuthenticatedPrincipal`] argument reject requests
//! without a valid bearer token with `401`. The principal's role is read from
//! the user store on every request, so a demoted or deleted account loses its
//! rights immediately.

use crate::core::auth::{AuthError, AuthPolicy, bearer_token};
use crate::core::error::{AppError, AuthorizationError, ValidationError};
use crate::core::policy::{Denial, DenialReason};
use crate::core::principal::Principal;
use crate::server::host::ServerHost;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use std::sync::Arc;

/// The principal resolved from the request's bearer token
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedPrincipal(pub Principal);

impl AuthenticatedPrincipal {
    /// Enforce a read-route policy
    pub fn require(&self, policy: AuthPolicy) -> Result<Principal, AppError> {
        if policy.check(&self.0) {
            Ok(self.0)
        } else {
            tracing::warn!(
                principal = self.0.id,
                role = %self.0.role,
                policy = ?policy,
                "read access denied"
            );
            Err(AuthorizationError::Denied(vec![Denial::new(DenialReason::InsufficientRole)]).into())
        }
    }
}

impl std::ops::Deref for AuthenticatedPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<Arc<ServerHost>> for AuthenticatedPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        host: &Arc<ServerHost>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claimed = host.auth.verify(token).await?;

        // Role and existence come from the store; the token only names the account.
        let user = host.users.get(claimed.id).await?.ok_or_else(|| {
            tracing::debug!(principal = claimed.id, "token names a deleted account");
            AuthError::InvalidToken
        })?;
        Ok(AuthenticatedPrincipal(Principal::new(user.id, user.role)))
    }
}

/// Integer id taken from a `{id}` path segment
///
/// Malformed ids are rejected as a validation error rather than axum's plain
/// text rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ValidationError::single("id", e.body_text()))?;

        raw.trim()
            .parse::<i64>()
            .map(EntityId)
            .map_err(|_| ValidationError::single("id", "invalid id").into())
    }
}
