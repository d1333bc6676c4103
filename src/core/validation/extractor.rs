//! Axum extractor for mutation bodies
//!
//! This module provides the `Proposed` extractor that turns a JSON object body
//! into [`ProposedFields`] before it reaches handlers.

use crate::core::error::{AppError, ValidationError};
use crate::core::field::ProposedFields;
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde_json::Value;

/// Proposed field changes taken from a JSON request body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn update_item(
///     principal: AuthenticatedPrincipal,
///     Path(id): Path<i64>,
///     Proposed(fields): Proposed,
/// ) -> Result<Json<ApiResponse>, AppError> {
///     // fields is a JSON object with nulls stripped
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Proposed(pub ProposedFields);

impl Proposed {
    pub fn into_inner(self) -> ProposedFields {
        self.0
    }
}

impl std::ops::Deref for Proposed {
    type Target = ProposedFields;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequest<S> for Proposed
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<Value> = Json::from_request(req, state).await.map_err(|e| {
            AppError::from(ValidationError::InvalidJson {
                message: e.body_text(),
            })
        })?;

        Ok(Proposed(ProposedFields::from_value(payload)?))
    }
}
