//! # Stockroom
//!
//! An inventory management REST backend with role-based, field-level
//! authorization.
//!
//! ## Features
//!
//! - **Field-level access policy**: every mutation is split into allowed and
//!   denied fields before it touches the store
//! - **Two roles**: administrators manage items and accounts; staff read
//!   everything and adjust item quantities
//! - **Normalizing validators**: trimming, numeric coercion and price rounding
//!   happen once, ahead of persistence
//! - **JWT bearer auth** with Argon2id password hashing
//! - **Pluggable storage**: stores are traits, in-memory implementations ship
//!   with the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stockroom::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_auth_provider(JwtAuthProvider::new("a-long-enough-secret", 168))
//!     .build()?;
//! ```
//!
//! ## Using the policy directly
//!
//! ```rust,ignore
//! let proposed = ProposedFields::new().with("quantity", 3).with("price", 9.5);
//! let request = MutationRequest::new(Principal::staff(2), proposed).targeting(10);
//!
//! let decision = AccessPolicy::new().authorize(&request, MutationKind::UpdateItem);
//! assert_eq!(decision.verdict(), Verdict::Deny);
//! ```

pub mod config;
pub mod core;
pub mod handlers;
pub mod seed;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Policy and validation ===
    pub use crate::core::{
        field::ProposedFields,
        mutation::{MutationKind, MutationRequest, fields},
        policy::{AccessPolicy, Decision, Denial, DenialReason, Verdict},
        principal::{Principal, Role},
        validation::{
            ItemChanges, ItemMode, ItemMutationValidator, UserChanges, UserMutationValidator,
        },
    };

    // === Entities and collaborators ===
    pub use crate::core::{
        auth::{AuthError, AuthPolicy, AuthProvider, JwtAuthProvider},
        credentials::{Argon2Hasher, CredentialError, CredentialHasher},
        entity::{Item, NewItem, NewUser, User, UserUpdate},
        price::Price,
        query::{ItemQuery, LowStockParams},
        service::{ItemLookup, ItemStore, UserLookup, UserStore},
    };

    // === Errors ===
    pub use crate::core::error::{
        AppError, AuthorizationError, ConflictError, EntityError, FieldValidationError,
        ValidationError,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryItemStore, InMemoryUserStore};

    // === Config ===
    pub use crate::config::{AppConfig, AuthConfig, SeedAdmin, SeedConfig, SeedItem, ServerConfig};

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost, exposure::RestExposure};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use axum::Router;
}
