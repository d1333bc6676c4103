//! HTTP handlers for the inventory API
//!
//! Handlers are thin: they resolve the principal, ask the host's access
//! policy which fields may proceed, run the matching validator and hand the
//! normalized result to the store. Every success is wrapped in
//! [`ApiResponse`]; every failure is an [`AppError`](crate::core::error::AppError).

pub mod auth;
pub mod items;
pub mod system;
pub mod users;

use crate::core::error::AppError;
use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Success envelope: `{ success: true, message, data }`
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

pub type ApiResult = Result<(StatusCode, Json<ApiResponse>), AppError>;

fn respond(status: StatusCode, message: &str, data: Value) -> ApiResult {
    Ok((
        status,
        Json(ApiResponse {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }),
    ))
}

pub fn ok(message: &str, data: Value) -> ApiResult {
    respond(StatusCode::OK, message, data)
}

pub fn created(message: &str, data: Value) -> ApiResult {
    respond(StatusCode::CREATED, message, data)
}
