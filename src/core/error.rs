//! Typed error handling for the stockroom API
//!
//! Every failure that can cross the HTTP boundary is a value of [`AppError`],
//! which knows its status code, its machine-readable error code and how to
//! render itself as a JSON response.
//!
//! # Error Categories
//!
//! - [`EntityError`]: target entity missing (404)
//! - [`AuthorizationError`]: role or self-action denial (403, 400 for empty updates)
//! - [`ValidationError`]: field-level input problems (400)
//! - [`ConflictError`]: unique key collisions (409)
//! - [`AuthError`]: missing or invalid credentials (401)
//! - [`StorageError`] / [`ConfigError`]: infrastructure failures (500)
//!
//! # Example
//!
//! ```rust,ignore
//! let item = host
//!     .items
//!     .get(id)
//!     .await?
//!     .ok_or(EntityError::not_found("item", id))?;
//! ```

use crate::core::auth::AuthError;
use crate::core::credentials::CredentialError;
use crate::core::policy::Denial;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the API
#[derive(Debug)]
pub enum AppError {
    /// Target entity missing
    Entity(EntityError),

    /// Access policy refused the request
    Authorization(AuthorizationError),

    /// Input failed validation
    Validation(ValidationError),

    /// Unique constraint collision
    Conflict(ConflictError),

    /// Authentication failed
    Auth(AuthError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Should not happen in normal operation
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Entity(e) => write!(f, "{}", e),
            AppError::Authorization(e) => write!(f, "{}", e),
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Conflict(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Storage(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Entity(e) => Some(e),
            AppError::Authorization(e) => Some(e),
            AppError::Validation(e) => Some(e),
            AppError::Conflict(e) => Some(e),
            AppError::Auth(e) => Some(e),
            AppError::Storage(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Internal(_) => None,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`, mirrors the success envelope
    pub success: bool,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Entity(e) => e.status_code(),
            AppError::Authorization(e) => e.status_code(),
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(AuthError::Issue(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Entity(e) => e.error_code(),
            AppError::Authorization(e) => e.error_code(),
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT_DUPLICATE",
            AppError::Auth(AuthError::Issue(_)) => "TOKEN_ISSUE_FAILED",
            AppError::Auth(_) => "UNAUTHORIZED",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({ "entity_type": entity_type, "id": id }))
            }
            AppError::Authorization(AuthorizationError::Denied(denials)) => {
                Some(serde_json::json!({ "denials": denials }))
            }
            AppError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            AppError::Conflict(ConflictError::Duplicate { field, value, .. }) => {
                Some(serde_json::json!({ "field": field, "value": value }))
            }
            _ => None,
        }
    }

    /// Field-level errors, when this is a validation failure
    pub fn field_errors(&self) -> Option<&[FieldValidationError]> {
        match self {
            AppError::Validation(ValidationError::FieldErrors(errors)) => Some(errors),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity lookups
#[derive(Debug)]
pub enum EntityError {
    NotFound { entity_type: &'static str, id: i64 },
}

impl EntityError {
    pub fn not_found(entity_type: &'static str, id: i64) -> Self {
        EntityError::NotFound { entity_type, id }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
        }
    }
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                let mut chars = entity_type.chars();
                let capitalized: String = chars
                    .next()
                    .map(|c| c.to_uppercase().chain(chars).collect())
                    .unwrap_or_default();
                write!(f, "{} not found (id {})", capitalized, id)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl From<EntityError> for AppError {
    fn from(err: EntityError) -> Self {
        AppError::Entity(err)
    }
}

// =============================================================================
// Authorization Errors
// =============================================================================

/// The access policy refused a request
#[derive(Debug)]
pub enum AuthorizationError {
    Denied(Vec<Denial>),
}

impl AuthorizationError {
    /// Status of the first denial; 403 when none was recorded
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthorizationError::Denied(denials) => denials
                .first()
                .map(|d| d.reason.status_code())
                .unwrap_or(StatusCode::FORBIDDEN),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "NO_FIELD_TO_UPDATE",
            _ => "AUTHORIZATION_DENIED",
        }
    }
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationError::Denied(denials) => match denials.first() {
                Some(denial) => write!(f, "Access denied: {}", denial.reason),
                None => write!(f, "Access denied"),
            },
        }
    }
}

impl std::error::Error for AuthorizationError {}

impl From<AuthorizationError> for AppError {
    fn from(err: AuthorizationError) -> Self {
        AppError::Authorization(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// One or more field-level problems
    FieldErrors(Vec<FieldValidationError>),

    /// Body is not the JSON shape expected
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ValidationError {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        ValidationError::FieldErrors(vec![FieldValidationError::new(field, message)])
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
                write!(f, "Validation failed: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

// =============================================================================
// Conflict Errors
// =============================================================================

/// Unique key collisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    Duplicate {
        entity_type: &'static str,
        field: &'static str,
        value: String,
    },
}

impl ConflictError {
    pub fn duplicate(entity_type: &'static str, field: &'static str, value: &str) -> Self {
        ConflictError::Duplicate {
            entity_type,
            field,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::Duplicate { field, .. } => write!(f, "duplicate {}", field),
        }
    }
}

impl std::error::Error for ConflictError {}

impl From<ConflictError> for AppError {
    fn from(err: ConflictError) -> Self {
        AppError::Conflict(err)
    }
}

// =============================================================================
// Auth and credential errors
// =============================================================================

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::Internal(err.to_string())
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// A lock guarding in-memory state was poisoned
    Poisoned { backend: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Poisoned { backend } => {
                write!(f, "{} state is unavailable (lock poisoned)", backend)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration or environment
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// Semantic validation of the loaded configuration failed
    Invalid { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::Invalid { message } => {
                write!(f, "Invalid configuration: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}
