//! User account field validation
//!
//! Passwords come out of here as plaintext; hashing is the caller's job.

use super::config::ValidationConfig;
use super::{filters, validators};
use crate::core::error::{AppError, ConflictError, ValidationError};
use crate::core::field::ProposedFields;
use crate::core::mutation::{MutationKind, fields};
use crate::core::principal::Role;
use crate::core::service::UserLookup;
use serde_json::Value;
use std::fmt;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;

/// Normalized account fields
///
/// `password` holds the new plaintext password for every kind that sets one
/// (`password` on create, `newPassword` on updates).
#[derive(Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub current_password: Option<String>,
    pub role: Option<Role>,
}

impl fmt::Debug for UserChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserChanges")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "current_password",
                &self.current_password.as_ref().map(|_| "<redacted>"),
            )
            .field("role", &self.role)
            .finish()
    }
}

impl UserChanges {
    /// Back to raw fields for `kind`; validating the result yields `self` again
    pub fn to_fields(&self, kind: MutationKind) -> ProposedFields {
        let password_key = match kind {
            MutationKind::CreateUser => fields::PASSWORD,
            _ => fields::NEW_PASSWORD,
        };

        let mut out = ProposedFields::new();
        if let Some(username) = &self.username {
            out.insert(fields::USERNAME, username.as_str());
        }
        if let Some(email) = &self.email {
            out.insert(fields::EMAIL, email.as_str());
        }
        if let Some(password) = &self.password {
            out.insert(password_key, password.as_str());
        }
        if let Some(current) = &self.current_password {
            out.insert(fields::CURRENT_PASSWORD, current.as_str());
        }
        if let Some(role) = self.role {
            out.insert(fields::ROLE, role.as_str());
        }
        out
    }
}

/// Validates proposed account fields per mutation kind
pub struct UserMutationValidator {
    create: ValidationConfig,
    update_role: ValidationConfig,
    update_password: ValidationConfig,
    update_own_password: ValidationConfig,
    none: ValidationConfig,
}

impl Default for UserMutationValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl UserMutationValidator {
    pub fn new() -> Self {
        let mut create = ValidationConfig::new();
        create.require(fields::USERNAME);
        create.add_filter(fields::USERNAME, filters::trim());
        create.add_validator(fields::USERNAME, validators::required());
        create.add_validator(fields::USERNAME, validators::string());
        create.add_validator(
            fields::USERNAME,
            validators::string_length(USERNAME_MIN, USERNAME_MAX),
        );
        create.add_filter(fields::EMAIL, filters::trim());
        create.add_validator(fields::EMAIL, validators::string());
        create.add_validator(fields::EMAIL, validators::email());
        Self::add_password(&mut create, fields::PASSWORD);
        Self::add_role(&mut create, false);

        let mut update_role = ValidationConfig::new();
        Self::add_role(&mut update_role, true);

        let mut update_password = ValidationConfig::new();
        Self::add_password(&mut update_password, fields::NEW_PASSWORD);

        let mut update_own_password = ValidationConfig::new();
        update_own_password.require(fields::CURRENT_PASSWORD);
        update_own_password.add_validator(fields::CURRENT_PASSWORD, validators::required());
        update_own_password.add_validator(fields::CURRENT_PASSWORD, validators::string());
        Self::add_password(&mut update_own_password, fields::NEW_PASSWORD);

        Self {
            create,
            update_role,
            update_password,
            update_own_password,
            none: ValidationConfig::new(),
        }
    }

    fn add_password(config: &mut ValidationConfig, field: &str) {
        config.require(field);
        config.add_validator(field, validators::required());
        config.add_validator(field, validators::string());
        config.add_validator(field, validators::min_length(PASSWORD_MIN));
    }

    fn add_role(config: &mut ValidationConfig, required: bool) {
        if required {
            config.require(fields::ROLE);
            config.add_validator(fields::ROLE, validators::required());
        }
        let roles = Role::ALL.iter().map(|r| r.as_str().to_string()).collect();
        config.add_validator(fields::ROLE, validators::in_list(roles));
    }

    fn config_for(&self, kind: MutationKind) -> &ValidationConfig {
        match kind {
            MutationKind::CreateUser => &self.create,
            MutationKind::UpdateUserRole => &self.update_role,
            MutationKind::UpdateUserPassword => &self.update_password,
            MutationKind::UpdateOwnPassword => &self.update_own_password,
            _ => &self.none,
        }
    }

    /// Type, range and presence checks for `kind`; no lookups
    ///
    /// Kinds that carry no account fields (`DeleteUser`, item kinds) yield an
    /// empty change set.
    pub fn validate_fields(
        &self,
        proposed: &ProposedFields,
        kind: MutationKind,
    ) -> Result<UserChanges, ValidationError> {
        let clean = self
            .config_for(kind)
            .validate_and_filter(proposed)
            .map_err(ValidationError::FieldErrors)?;

        let text = |key: &str| clean.get(key).and_then(Value::as_str).map(str::to_string);
        let password_key = match kind {
            MutationKind::CreateUser => fields::PASSWORD,
            _ => fields::NEW_PASSWORD,
        };

        let mut changes = UserChanges {
            username: text(fields::USERNAME),
            email: text(fields::EMAIL).filter(|e| !e.is_empty()),
            password: text(password_key),
            current_password: text(fields::CURRENT_PASSWORD),
            role: clean
                .get(fields::ROLE)
                .and_then(Value::as_str)
                .and_then(Role::parse_exact),
        };

        if kind == MutationKind::CreateUser {
            changes.role.get_or_insert(Role::Staff);
        }

        Ok(changes)
    }

    /// Full validation including username and email uniqueness pre-checks
    pub async fn validate<L>(
        &self,
        proposed: &ProposedFields,
        kind: MutationKind,
        lookup: &L,
    ) -> Result<UserChanges, AppError>
    where
        L: UserLookup + ?Sized,
    {
        let changes = self.validate_fields(proposed, kind)?;

        if let Some(username) = changes.username.as_deref()
            && lookup.find_user_by_username(username).await?.is_some()
        {
            return Err(ConflictError::duplicate("user", fields::USERNAME, username).into());
        }

        if let Some(email) = changes.email.as_deref()
            && lookup.find_user_by_email(email).await?.is_some()
        {
            return Err(ConflictError::duplicate("user", fields::EMAIL, email).into());
        }

        Ok(changes)
    }
}
