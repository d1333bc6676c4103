//! Validation and filtering
//!
//! Field values pass through per-field filter/validator pipelines
//! ([`ValidationConfig`]) before the item and user validators turn them into
//! typed change sets.

pub mod config;
pub mod extractor;
pub mod filters;
pub mod item;
pub mod user;
pub mod validators;

pub use config::ValidationConfig;
pub use extractor::Proposed;
pub use item::{ItemChanges, ItemMode, ItemMutationValidator};
pub use user::{UserChanges, UserMutationValidator};
