//! User administration and own-account routes

use super::{ApiResult, ok};
use crate::core::auth::AuthPolicy;
use crate::core::entity::{User, UserUpdate};
use crate::core::error::{AppError, EntityError};
use crate::core::extractors::{AuthenticatedPrincipal, EntityId};
use crate::core::field::ProposedFields;
use crate::core::mutation::{MutationKind, MutationRequest, fields};
use crate::core::validation::{Proposed, UserChanges};
use crate::server::host::ServerHost;
use axum::extract::State;
use serde_json::{Value, json};
use std::sync::Arc;

async fn existing_user(host: &ServerHost, id: i64) -> Result<User, AppError> {
    host.users
        .get(id)
        .await?
        .ok_or_else(|| EntityError::not_found("user", id).into())
}

/// Hash the validated new password into a stored-account update
async fn password_update(host: &ServerHost, changes: UserChanges) -> Result<UserUpdate, AppError> {
    let password = changes.password.ok_or_else(|| {
        AppError::Internal("validated password change carries no password".to_string())
    })?;
    Ok(UserUpdate {
        password_hash: Some(host.hash_password(password).await?),
        ..UserUpdate::default()
    })
}

pub async fn list_users(
    State(host): State<Arc<ServerHost>>,
    principal: AuthenticatedPrincipal,
) -> ApiResult {
    principal.require(AuthPolicy::AdminOnly)?;
    let users = host.users.list().await?;
    ok(
        "Users retrieved successfully",
        json!({ "count": users.len(), "users": users }),
    )
}

pub async fn get_user(
    State(host): State<Arc<ServerHost>>,
    principal: AuthenticatedPrincipal,
    EntityId(id): EntityId,
) -> ApiResult {
    principal.require(AuthPolicy::AdminOnly)?;
    let user = existing_user(&host, id).await?;
    ok("User retrieved successfully", json!({ "user": user }))
}

pub async fn update_user_role(
    State(host): State<Arc<ServerHost>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    EntityId(id): EntityId,
    Proposed(fields): Proposed,
) -> ApiResult {
    let request = MutationRequest::new(principal, fields).targeting(id);
    let permitted = host.authorize(&request, MutationKind::UpdateUserRole)?;

    existing_user(&host, id).await?;
    let changes = host
        .user_validator
        .validate(&permitted, MutationKind::UpdateUserRole, host.users.as_ref())
        .await?;
    let user = host
        .users
        .update(
            id,
            UserUpdate {
                role: changes.role,
                ..UserUpdate::default()
            },
        )
        .await?;

    tracing::info!(principal = principal.id, user = user.id, role = %user.role, "user role updated");
    ok(
        "User role updated successfully",
        json!({
            "user": {
                "id": user.id,
                "username": user.username,
                "role": user.role,
                "updatedAt": user.updated_at,
            }
        }),
    )
}

/// Administrative password reset
pub async fn update_user_password(
    State(host): State<Arc<ServerHost>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    EntityId(id): EntityId,
    Proposed(fields): Proposed,
) -> ApiResult {
    let request = MutationRequest::new(principal, fields).targeting(id);
    let permitted = host.authorize(&request, MutationKind::UpdateUserPassword)?;

    existing_user(&host, id).await?;
    let changes = host
        .user_validator
        .validate(&permitted, MutationKind::UpdateUserPassword, host.users.as_ref())
        .await?;
    let update = password_update(&host, changes).await?;
    let user = host.users.update(id, update).await?;

    tracing::info!(principal = principal.id, user = user.id, "user password reset");
    ok(
        "User password updated successfully",
        json!({ "user": { "id": user.id, "username": user.username } }),
    )
}

pub async fn delete_user(
    State(host): State<Arc<ServerHost>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    EntityId(id): EntityId,
) -> ApiResult {
    let request = MutationRequest::new(principal, ProposedFields::new()).targeting(id);
    host.authorize(&request, MutationKind::DeleteUser)?;

    let user = host
        .users
        .delete(id)
        .await?
        .ok_or(EntityError::not_found("user", id))?;

    tracing::info!(principal = principal.id, user = user.id, username = %user.username, "user deleted");
    ok(
        "User deleted successfully",
        json!({
            "deletedUser": {
                "id": user.id,
                "username": user.username,
                "role": user.role,
            }
        }),
    )
}

/// Change the caller's own password
///
/// `currentPassword` is checked against the stored hash before the policy
/// runs; the policy refuses the change unless that check passed.
pub async fn update_my_password(
    State(host): State<Arc<ServerHost>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Proposed(body): Proposed,
) -> ApiResult {
    let user = existing_user(&host, principal.id).await?;

    let verified = match body.get(fields::CURRENT_PASSWORD).and_then(Value::as_str) {
        Some(current) => {
            host.verify_password(current.to_string(), user.password_hash.clone())
                .await?
        }
        None => false,
    };

    let request = MutationRequest::new(principal, body)
        .targeting(principal.id)
        .with_password_check(verified);
    let permitted = host.authorize(&request, MutationKind::UpdateOwnPassword)?;

    let changes = host
        .user_validator
        .validate(&permitted, MutationKind::UpdateOwnPassword, host.users.as_ref())
        .await?;
    let update = password_update(&host, changes).await?;
    host.users.update(user.id, update).await?;

    tracing::info!(user = user.id, "own password changed");
    ok(
        "Password updated successfully",
        json!({ "user": { "id": user.id, "username": user.username } }),
    )
}
