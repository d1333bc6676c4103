//! Authenticated principals and their roles
//!
//! A [`Principal`] is what the authentication layer hands to the rest of the
//! system once a bearer token has been verified: an account id and a role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role attached to every account
///
/// Stored and serialized in lowercase (`"admin"`, `"staff"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to items and user administration
    Admin,

    /// May read everything and adjust item quantities
    #[default]
    Staff,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 2] = [Role::Admin, Role::Staff];

    /// Stored representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    /// Parse the stored representation exactly (case-sensitive)
    pub fn parse_exact(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == s)
    }

    /// Parse a role coming from outside the store (token claims, legacy rows)
    ///
    /// Older account rows used `ADMIN`/`STAFF`, so casing is ignored here.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated actor performing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
}

impl Principal {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn admin(id: i64) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn staff(id: i64) -> Self {
        Self::new(id, Role::Staff)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether `target_id` is this principal's own account
    pub fn is_self(&self, target_id: i64) -> bool {
        self.id == target_id
    }
}
