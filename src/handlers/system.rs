//! Welcome, health and fallback routes

use super::{ApiResult, ok};
use crate::server::host::ServerHost;
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use serde_json::json;
use std::sync::Arc;

pub async fn welcome() -> ApiResult {
    ok(
        "Welcome to the Stockroom inventory API",
        json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/api/auth",
                "users": "/api/users",
                "items": "/api/items",
                "health": "/api/health",
            }
        }),
    )
}

pub async fn health(State(host): State<Arc<ServerHost>>) -> ApiResult {
    let items = host.items.count().await?;
    ok(
        "Server is running",
        json!({
            "status": "ok",
            "uptimeSeconds": host.started_at.elapsed().as_secs(),
            "items": items,
            "timestamp": chrono::Utc::now(),
        }),
    )
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "path": uri.path(),
        })),
    )
}
