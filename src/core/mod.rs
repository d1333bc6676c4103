//! Core module containing the domain types, the access policy and validators

pub mod auth;
pub mod credentials;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod field;
pub mod mutation;
pub mod policy;
pub mod price;
pub mod principal;
pub mod query;
pub mod service;
pub mod validation;

pub use auth::{AuthError, AuthPolicy, AuthProvider, JwtAuthProvider};
pub use credentials::{Argon2Hasher, CredentialError, CredentialHasher};
pub use entity::{Entity, Item, NewItem, NewUser, User, UserUpdate};
pub use error::{AppError, ConflictError, EntityError, ValidationError};
pub use extractors::{AuthenticatedPrincipal, EntityId};
pub use field::ProposedFields;
pub use mutation::{MutationKind, MutationRequest};
pub use policy::{AccessPolicy, Decision, Denial, DenialReason, Verdict};
pub use price::Price;
pub use principal::{Principal, Role};
pub use query::{ItemQuery, LowStockParams};
pub use service::{ItemLookup, ItemStore, UserLookup, UserStore};
pub use validation::{
    ItemChanges, ItemMode, ItemMutationValidator, Proposed, UserChanges, UserMutationValidator,
};
