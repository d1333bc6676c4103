//! Storage collaborator traits for items and users
//!
//! Implementations provide CRUD-by-key plus the lookups the validators need.
//! Unique constraints are the store's responsibility: `create` and `update`
//! must check and write atomically and report collisions as
//! [`ConflictError`](crate::core::error::ConflictError).

use crate::core::entity::{Item, NewItem, NewUser, User, UserUpdate};
use crate::core::error::AppError;
use crate::core::query::ItemQuery;
use crate::core::validation::ItemChanges;
use async_trait::async_trait;

/// Read-only item name lookup used for uniqueness pre-checks
#[async_trait]
pub trait ItemLookup: Send + Sync {
    /// Id of the item carrying exactly this name, if any
    async fn find_item_by_name(&self, name: &str) -> Result<Option<i64>, AppError>;
}

/// Read-only user lookups used for uniqueness pre-checks
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<i64>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<i64>, AppError>;
}

/// Item persistence
#[async_trait]
pub trait ItemStore: ItemLookup {
    async fn get(&self, id: i64) -> Result<Option<Item>, AppError>;

    /// All items, newest first
    async fn list(&self) -> Result<Vec<Item>, AppError>;

    async fn create(&self, item: NewItem) -> Result<Item, AppError>;

    /// Apply a validated change set; fails with `NotFound` for unknown ids
    async fn update(&self, id: i64, changes: &ItemChanges) -> Result<Item, AppError>;

    /// Remove and return the item, `None` when it did not exist
    async fn delete(&self, id: i64) -> Result<Option<Item>, AppError>;

    /// Items matching the query, ordered by name
    async fn search(&self, query: &ItemQuery) -> Result<Vec<Item>, AppError>;

    /// Items with `quantity <= threshold`, lowest quantity first
    async fn low_stock(&self, threshold: i64) -> Result<Vec<Item>, AppError>;

    async fn count(&self) -> Result<usize, AppError>;
}

/// User account persistence
#[async_trait]
pub trait UserStore: UserLookup {
    async fn get(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// All users, newest first
    async fn list(&self) -> Result<Vec<User>, AppError>;

    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn update(&self, id: i64, update: UserUpdate) -> Result<User, AppError>;

    async fn delete(&self, id: i64) -> Result<Option<User>, AppError>;
}
