//! Server host holding the shared application state
//!
//! The host owns every collaborator a request may need: the stores, the
//! authentication provider, the password hasher, the access policy and the
//! validators. It is transport-agnostic; [`RestExposure`] turns it into an
//! axum router.
//!
//! [`RestExposure`]: crate::server::exposure::RestExposure

use crate::core::auth::AuthProvider;
use crate::core::credentials::CredentialHasher;
use crate::core::error::AppError;
use crate::core::field::ProposedFields;
use crate::core::mutation::{MutationKind, MutationRequest};
use crate::core::policy::{AccessPolicy, Verdict};
use crate::core::service::{ItemStore, UserStore};
use crate::core::validation::{ItemMutationValidator, UserMutationValidator};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;

/// Host context containing all application state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(
///     ServerBuilder::new()
///         .with_auth_provider(JwtAuthProvider::new(secret, 168))
///         .build_host()?,
/// );
/// let app = RestExposure::build_router(host, vec![])?;
/// ```
pub struct ServerHost {
    pub items: Arc<dyn ItemStore>,

    pub users: Arc<dyn UserStore>,

    /// Bearer-token verification and issuance
    pub auth: Arc<dyn AuthProvider>,

    /// Password hashing; calls are CPU-heavy, run them off the async workers
    pub hasher: Arc<dyn CredentialHasher>,

    pub policy: AccessPolicy,

    pub item_validator: ItemMutationValidator,

    pub user_validator: UserMutationValidator,

    /// Used by the health endpoint to report uptime
    pub started_at: Instant,
}

impl ServerHost {
    pub fn from_builder_components(
        items: Arc<dyn ItemStore>,
        users: Arc<dyn UserStore>,
        auth: Arc<dyn AuthProvider>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Result<Self> {
        Ok(Self {
            items,
            users,
            auth,
            hasher,
            policy: AccessPolicy::new(),
            item_validator: ItemMutationValidator::new(),
            user_validator: UserMutationValidator::new(),
            started_at: Instant::now(),
        })
    }

    /// Run the access policy and narrow the request to its allowed fields
    ///
    /// Denials become [`AppError::Authorization`]; partially denied requests
    /// continue with the allowed fields only.
    pub fn authorize(
        &self,
        request: &MutationRequest,
        kind: MutationKind,
    ) -> Result<ProposedFields, AppError> {
        let decision = self.policy.authorize(request, kind);

        match decision.verdict() {
            Verdict::Allow => {}
            Verdict::PartialDeny => tracing::warn!(
                principal = request.principal.id,
                kind = %kind,
                dropped = ?decision.denied_fields,
                "dropping fields the principal may not write"
            ),
            Verdict::Deny => tracing::warn!(
                principal = request.principal.id,
                role = %request.principal.role,
                kind = %kind,
                target = ?request.target_id,
                reason = ?decision.primary_reason(),
                "mutation denied"
            ),
        }

        Ok(decision.permitted(&request.proposed)?)
    }

    /// Hash a password on the blocking pool
    pub async fn hash_password(&self, plaintext: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(AppError::from)
    }

    /// Compare a password against a stored hash on the blocking pool
    pub async fn verify_password(&self, plaintext: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))
    }
}
