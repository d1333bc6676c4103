//! Route tables for the inventory API

use super::host::ServerHost;
use crate::handlers::{auth, items, users};
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Authentication routes
///
/// - POST /api/auth/login - Exchange credentials for a bearer token
/// - POST /api/auth/register - Create an account (admin)
/// - GET /api/auth/me - The caller's profile
pub fn build_auth_routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/me", get(auth::me))
}

/// User routes
///
/// `/api/users/me` is registered alongside `/api/users/{id}`; axum prefers
/// the static segment.
pub fn build_user_routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/me", get(auth::me))
        .route("/api/users/me/password", put(users::update_my_password))
        .route(
            "/api/users/{id}",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/api/users/{id}/role", put(users::update_user_role))
        .route("/api/users/{id}/password", put(users::update_user_password))
}

/// Item routes
pub fn build_item_routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/api/items", get(items::list_items).post(items::create_item))
        .route("/api/items/search", get(items::search_items))
        .route("/api/items/low-stock", get(items::low_stock_items))
        .route(
            "/api/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
}
