//! Login, registration and profile routes

use super::{ApiResult, created, ok};
use crate::core::auth::AuthError;
use crate::core::entity::NewUser;
use crate::core::error::{AppError, EntityError, FieldValidationError, ValidationError};
use crate::core::extractors::AuthenticatedPrincipal;
use crate::core::field::ProposedFields;
use crate::core::mutation::{MutationKind, MutationRequest, fields};
use crate::core::validation::Proposed;
use crate::server::host::ServerHost;
use axum::extract::State;
use serde_json::{Value, json};
use std::sync::Arc;

/// `username` and `password` as submitted; both must be non-empty strings
fn login_credentials(body: &ProposedFields) -> Result<(String, String), ValidationError> {
    let mut errors = Vec::new();
    let mut text = |key: &str| {
        let value = body
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty());
        if value.is_none() {
            errors.push(FieldValidationError::new(key, format!("{} is required", key)));
        }
        value.map(str::to_string)
    };

    let username = text(fields::USERNAME);
    let password = text(fields::PASSWORD);
    match (username, password) {
        (Some(username), Some(password)) => Ok((username.trim().to_string(), password)),
        _ => Err(ValidationError::FieldErrors(errors)),
    }
}

pub async fn login(State(host): State<Arc<ServerHost>>, Proposed(body): Proposed) -> ApiResult {
    let (username, password) = login_credentials(&body)?;

    let Some(user) = host.users.get_by_username(&username).await? else {
        tracing::warn!(username = %username, "login failed: unknown user");
        return Err(AuthError::InvalidCredentials.into());
    };

    if !host
        .verify_password(password, user.password_hash.clone())
        .await?
    {
        tracing::warn!(user = user.id, "login failed: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = host.auth.issue(&user)?;
    tracing::info!(user = user.id, role = %user.role, "login succeeded");
    ok("Login successful", json!({ "token": token, "user": user }))
}

/// Admin-only account creation
pub async fn register(
    State(host): State<Arc<ServerHost>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Proposed(fields): Proposed,
) -> ApiResult {
    let request = MutationRequest::new(principal, fields);
    let permitted = host.authorize(&request, MutationKind::CreateUser)?;

    let changes = host
        .user_validator
        .validate(&permitted, MutationKind::CreateUser, host.users.as_ref())
        .await?;
    let (Some(username), Some(password)) = (changes.username, changes.password) else {
        return Err(AppError::Internal(
            "validated account is missing username or password".to_string(),
        ));
    };

    let password_hash = host.hash_password(password).await?;
    let user = host
        .users
        .create(NewUser {
            username,
            email: changes.email,
            password_hash,
            role: changes.role.unwrap_or_default(),
        })
        .await?;

    tracing::info!(principal = principal.id, user = user.id, role = %user.role, "user registered");
    created("User registered successfully", json!({ "user": user }))
}

/// The caller's own account
pub async fn me(
    State(host): State<Arc<ServerHost>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> ApiResult {
    let user = host
        .users
        .get(principal.id)
        .await?
        .ok_or(EntityError::not_found("user", principal.id))?;
    ok("Profile retrieved successfully", json!({ "user": user }))
}
