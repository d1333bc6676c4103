//! Item routes

use super::{ApiResult, created, ok};
use crate::core::auth::AuthPolicy;
use crate::core::error::{AppError, EntityError, ValidationError};
use crate::core::extractors::{AuthenticatedPrincipal, EntityId};
use crate::core::field::ProposedFields;
use crate::core::mutation::{MutationKind, MutationRequest};
use crate::core::query::{ItemQuery, LowStockParams};
use crate::core::validation::{ItemMode, Proposed};
use crate::server::host::ServerHost;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde_json::json;
use std::sync::Arc;

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ValidationError::single("query", e.body_text()).into())
}

pub async fn list_items(
    State(host): State<Arc<ServerHost>>,
    principal: AuthenticatedPrincipal,
) -> ApiResult {
    principal.require(AuthPolicy::Authenticated)?;
    let items = host.items.list().await?;
    ok(
        "Items retrieved successfully",
        json!({ "count": items.len(), "items": items }),
    )
}

pub async fn search_items(
    State(host): State<Arc<ServerHost>>,
    principal: AuthenticatedPrincipal,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> ApiResult {
    principal.require(AuthPolicy::Authenticated)?;
    let query = query_params(query)?;
    let items = host.items.search(&query).await?;
    ok(
        "Search completed successfully",
        json!({ "count": items.len(), "items": items, "filters": query }),
    )
}

pub async fn low_stock_items(
    State(host): State<Arc<ServerHost>>,
    principal: AuthenticatedPrincipal,
    params: Result<Query<LowStockParams>, QueryRejection>,
) -> ApiResult {
    principal.require(AuthPolicy::Authenticated)?;
    let params = query_params(params)?;
    let items = host.items.low_stock(params.threshold).await?;
    ok(
        "Low stock items retrieved successfully",
        json!({ "count": items.len(), "items": items, "threshold": params.threshold }),
    )
}

pub async fn get_item(
    State(host): State<Arc<ServerHost>>,
    principal: AuthenticatedPrincipal,
    EntityId(id): EntityId,
) -> ApiResult {
    principal.require(AuthPolicy::Authenticated)?;
    let item = host
        .items
        .get(id)
        .await?
        .ok_or(EntityError::not_found("item", id))?;
    ok("Item retrieved successfully", json!({ "item": item }))
}

pub async fn create_item(
    State(host): State<Arc<ServerHost>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Proposed(fields): Proposed,
) -> ApiResult {
    let request = MutationRequest::new(principal, fields);
    let permitted = host.authorize(&request, MutationKind::CreateItem)?;

    let new_item = host
        .item_validator
        .validate(&permitted, &ItemMode::Create, host.items.as_ref())
        .await?
        .into_new_item()?;
    let item = host.items.create(new_item).await?;

    tracing::info!(principal = principal.id, item = item.id, name = %item.name, "item created");
    created("Item created successfully", json!({ "item": item }))
}

pub async fn update_item(
    State(host): State<Arc<ServerHost>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    EntityId(id): EntityId,
    Proposed(fields): Proposed,
) -> ApiResult {
    let request = MutationRequest::new(principal, fields).targeting(id);
    let permitted = host.authorize(&request, MutationKind::UpdateItem)?;

    let current = host
        .items
        .get(id)
        .await?
        .ok_or(EntityError::not_found("item", id))?;
    let mode = ItemMode::Update {
        id,
        current_name: current.name,
    };
    let changes = host
        .item_validator
        .validate(&permitted, &mode, host.items.as_ref())
        .await?;
    let item = host.items.update(id, &changes).await?;

    tracing::info!(
        principal = principal.id,
        role = %principal.role,
        item = item.id,
        changes = ?changes,
        "item updated"
    );
    ok("Item updated successfully", json!({ "item": item }))
}

pub async fn delete_item(
    State(host): State<Arc<ServerHost>>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    EntityId(id): EntityId,
) -> ApiResult {
    let request = MutationRequest::new(principal, ProposedFields::new()).targeting(id);
    host.authorize(&request, MutationKind::DeleteItem)?;

    let item = host
        .items
        .delete(id)
        .await?
        .ok_or(EntityError::not_found("item", id))?;

    tracing::info!(principal = principal.id, item = item.id, name = %item.name, "item deleted");
    ok(
        "Item deleted successfully",
        json!({
            "deletedItem": {
                "id": item.id,
                "name": item.name,
                "quantity": item.quantity,
                "price": item.price,
            }
        }),
    )
}
