//! In-memory item and user stores for testing and development
//!
//! Each store keeps its rows behind one `RwLock`; unique keys are checked and
//! the row written under the same write guard, so concurrent writers cannot
//! both claim a name.

use crate::core::entity::{Entity, Item, NewItem, NewUser, User, UserUpdate};
use crate::core::error::{AppError, ConflictError, EntityError, StorageError};
use crate::core::query::ItemQuery;
use crate::core::service::{ItemLookup, ItemStore, UserLookup, UserStore};
use crate::core::validation::ItemChanges;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Rows of one entity type with auto-increment ids
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Entity> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// First unique key of `candidate` already held by another row
    fn conflict(&self, candidate: &T) -> Option<ConflictError> {
        let keys = candidate.unique_keys();
        self.rows
            .values()
            .filter(|row| row.id() != candidate.id())
            .find_map(|row| {
                let taken = row.unique_keys();
                keys.iter()
                    .find(|key| taken.contains(*key))
                    .map(|(field, value)| {
                        ConflictError::duplicate(T::resource_name_singular(), *field, value)
                    })
            })
    }

    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> Result<T, AppError> {
        let row = build(self.next_id);
        if let Some(conflict) = self.conflict(&row) {
            return Err(conflict.into());
        }
        self.next_id += 1;
        self.rows.insert(row.id(), row.clone());
        Ok(row)
    }

    fn replace(&mut self, row: T) -> Result<T, AppError> {
        if let Some(conflict) = self.conflict(&row) {
            return Err(conflict.into());
        }
        self.rows.insert(row.id(), row.clone());
        Ok(row)
    }

    fn find_id(&self, field: &str, value: &str) -> Option<i64> {
        self.rows
            .values()
            .find(|row| {
                row.unique_keys()
                    .iter()
                    .any(|(f, v)| *f == field && v == value)
            })
            .map(|row| row.id())
    }

    /// Rows ordered newest first
    fn newest_first(&self) -> Vec<T> {
        let mut rows: Vec<T> = self.rows.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        rows
    }
}

fn read<'a, T>(
    lock: &'a RwLock<Table<T>>,
    backend: &str,
) -> Result<RwLockReadGuard<'a, Table<T>>, StorageError> {
    lock.read().map_err(|_| StorageError::Poisoned {
        backend: backend.to_string(),
    })
}

fn write<'a, T>(
    lock: &'a RwLock<Table<T>>,
    backend: &str,
) -> Result<RwLockWriteGuard<'a, Table<T>>, StorageError> {
    lock.write().map_err(|_| StorageError::Poisoned {
        backend: backend.to_string(),
    })
}

// =============================================================================
// Items
// =============================================================================

const ITEMS: &str = "in-memory item store";

/// In-memory item store
///
/// Cloning shares the underlying table.
#[derive(Clone)]
pub struct InMemoryItemStore {
    table: Arc<RwLock<Table<Item>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::new())),
        }
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemLookup for InMemoryItemStore {
    async fn find_item_by_name(&self, name: &str) -> Result<Option<i64>, AppError> {
        Ok(read(&self.table, ITEMS)?.find_id("name", name))
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, id: i64) -> Result<Option<Item>, AppError> {
        Ok(read(&self.table, ITEMS)?.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Item>, AppError> {
        Ok(read(&self.table, ITEMS)?.newest_first())
    }

    async fn create(&self, item: NewItem) -> Result<Item, AppError> {
        let now = Utc::now();
        write(&self.table, ITEMS)?.insert_with(|id| Item {
            id,
            name: item.name,
            description: item.description,
            quantity: item.quantity,
            price: item.price,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, id: i64, changes: &ItemChanges) -> Result<Item, AppError> {
        let mut table = write(&self.table, ITEMS)?;
        let mut item = table
            .rows
            .get(&id)
            .cloned()
            .ok_or(EntityError::not_found("item", id))?;

        changes.apply_to(&mut item);
        item.updated_at = Utc::now();
        table.replace(item)
    }

    async fn delete(&self, id: i64) -> Result<Option<Item>, AppError> {
        Ok(write(&self.table, ITEMS)?.rows.remove(&id))
    }

    async fn search(&self, query: &ItemQuery) -> Result<Vec<Item>, AppError> {
        let table = read(&self.table, ITEMS)?;
        let mut items: Vec<Item> = table
            .rows
            .values()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn low_stock(&self, threshold: i64) -> Result<Vec<Item>, AppError> {
        let table = read(&self.table, ITEMS)?;
        let mut items: Vec<Item> = table
            .rows
            .values()
            .filter(|item| i64::from(item.quantity) <= threshold)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.quantity.cmp(&b.quantity).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn count(&self) -> Result<usize, AppError> {
        Ok(read(&self.table, ITEMS)?.rows.len())
    }
}

// =============================================================================
// Users
// =============================================================================

const USERS: &str = "in-memory user store";

/// In-memory user store
#[derive(Clone)]
pub struct InMemoryUserStore {
    table: Arc<RwLock<Table<User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table::new())),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserLookup for InMemoryUserStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<i64>, AppError> {
        Ok(read(&self.table, USERS)?.find_id("username", username))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<i64>, AppError> {
        Ok(read(&self.table, USERS)?.find_id("email", email))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(read(&self.table, USERS)?.rows.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let table = read(&self.table, USERS)?;
        Ok(table
            .rows
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(read(&self.table, USERS)?.newest_first())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let now = Utc::now();
        write(&self.table, USERS)?.insert_with(|id| User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, id: i64, update: UserUpdate) -> Result<User, AppError> {
        let mut table = write(&self.table, USERS)?;
        let mut user = table
            .rows
            .get(&id)
            .cloned()
            .ok_or(EntityError::not_found("user", id))?;

        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(hash) = update.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        table.replace(user)
    }

    async fn delete(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(write(&self.table, USERS)?.rows.remove(&id))
    }
}
