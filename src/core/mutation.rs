//! Mutation kinds and the per-request mutation envelope

use crate::core::field::ProposedFields;
use crate::core::principal::Principal;
use serde::Serialize;
use std::fmt;

/// Wire names of every mutable field
pub mod fields {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const QUANTITY: &str = "quantity";
    pub const PRICE: &str = "price";

    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const NEW_PASSWORD: &str = "newPassword";
    pub const CURRENT_PASSWORD: &str = "currentPassword";
    pub const ROLE: &str = "role";

    pub const ITEM_FIELDS: &[&str] = &[NAME, DESCRIPTION, QUANTITY, PRICE];
}

/// Every mutation the API can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    CreateItem,
    UpdateItem,
    DeleteItem,
    CreateUser,
    UpdateUserRole,
    UpdateUserPassword,
    DeleteUser,
    UpdateOwnPassword,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::CreateItem => "create_item",
            MutationKind::UpdateItem => "update_item",
            MutationKind::DeleteItem => "delete_item",
            MutationKind::CreateUser => "create_user",
            MutationKind::UpdateUserRole => "update_user_role",
            MutationKind::UpdateUserPassword => "update_user_password",
            MutationKind::DeleteUser => "delete_user",
            MutationKind::UpdateOwnPassword => "update_own_password",
        }
    }

    /// Update kinds must carry at least one field
    pub fn is_update(&self) -> bool {
        matches!(
            self,
            MutationKind::UpdateItem
                | MutationKind::UpdateUserRole
                | MutationKind::UpdateUserPassword
                | MutationKind::UpdateOwnPassword
        )
    }

    /// Kinds reserved to administrators
    ///
    /// `UpdateItem` is absent: staff may update quantities.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            MutationKind::CreateItem
                | MutationKind::DeleteItem
                | MutationKind::CreateUser
                | MutationKind::UpdateUserRole
                | MutationKind::UpdateUserPassword
                | MutationKind::DeleteUser
        )
    }

    /// Kinds that may never target the acting principal's own account
    pub fn forbids_self_target(&self) -> bool {
        matches!(
            self,
            MutationKind::UpdateUserRole | MutationKind::DeleteUser
        )
    }

    /// Fields this kind may write
    pub fn writable_fields(&self) -> &'static [&'static str] {
        match self {
            MutationKind::CreateItem | MutationKind::UpdateItem => fields::ITEM_FIELDS,
            MutationKind::CreateUser => &[
                fields::USERNAME,
                fields::EMAIL,
                fields::PASSWORD,
                fields::ROLE,
            ],
            MutationKind::UpdateUserRole => &[fields::ROLE],
            MutationKind::UpdateUserPassword => &[fields::NEW_PASSWORD],
            MutationKind::UpdateOwnPassword => &[fields::CURRENT_PASSWORD, fields::NEW_PASSWORD],
            MutationKind::DeleteItem | MutationKind::DeleteUser => &[],
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested mutation, built per call and never persisted
#[derive(Debug, Clone)]
pub struct MutationRequest {
    pub principal: Principal,

    /// Entity the mutation targets (absent on create)
    pub target_id: Option<i64>,

    pub proposed: ProposedFields,

    /// Outcome of comparing `currentPassword` against the stored credential,
    /// filled in by the caller for `UpdateOwnPassword`
    pub current_password_verified: Option<bool>,
}

impl MutationRequest {
    pub fn new(principal: Principal, proposed: ProposedFields) -> Self {
        Self {
            principal,
            target_id: None,
            proposed,
            current_password_verified: None,
        }
    }

    pub fn targeting(mut self, target_id: i64) -> Self {
        self.target_id = Some(target_id);
        self
    }

    pub fn with_password_check(mut self, verified: bool) -> Self {
        self.current_password_verified = Some(verified);
        self
    }
}
