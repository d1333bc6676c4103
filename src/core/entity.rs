//! Entities held by the store: items and user accounts

use crate::core::price::Price;
use crate::core::principal::Role;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Base trait for every stored entity
///
/// All entities have:
/// - id: store-assigned integer key
/// - created_at: insertion timestamp, used for newest-first listings
/// - unique keys: values the store must keep unique across rows
pub trait Entity: Clone + Send + Sync + 'static {
    /// The singular resource name (e.g., "item")
    fn resource_name_singular() -> &'static str;

    fn id(&self) -> i64;

    fn created_at(&self) -> DateTime<Utc>;

    /// `(field, value)` pairs covered by a unique constraint
    fn unique_keys(&self) -> Vec<(&'static str, String)>;
}

/// An inventory item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub price: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Item {
    fn resource_name_singular() -> &'static str {
        "item"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }
}

/// A validated item ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub price: Price,
}

/// A user account
///
/// The password hash never leaves the process: it is skipped on
/// serialization and redacted from `Debug`.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Entity for User {
    fn resource_name_singular() -> &'static str {
        "user"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        let mut keys = vec![("username", self.username.clone())];
        if let Some(email) = &self.email {
            keys.push(("email", email.clone()));
        }
        keys
    }
}

/// A validated account ready for insertion; the password is already hashed
#[derive(Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Stored-account changes; the password is already hashed
#[derive(Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

impl fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserUpdate")
            .field("role", &self.role)
            .field("password_changed", &self.password_hash.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 1,
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_serialization_hides_password() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
        assert_eq!(json["username"], "alice");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_user_debug_redacts_hash() {
        let debug = format!("{:?}", user());
        assert!(!debug.contains("$argon2id$secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_unique_keys() {
        let mut account = user();
        assert_eq!(account.unique_keys().len(), 2);
        account.email = None;
        assert_eq!(account.unique_keys(), vec![("username", "alice".to_string())]);
    }

    #[test]
    fn test_entity_metadata() {
        assert_eq!(Item::resource_name_singular(), "item");
        assert_eq!(User::resource_name_singular(), "user");
    }
}
