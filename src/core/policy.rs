//! Field-level access policy for item and user mutations
//!
//! [`AccessPolicy::authorize`] looks at who is asking, what they want to do and
//! which fields they propose to change, and returns a [`Decision`] partitioning
//! the proposed fields into allowed and denied sets.
//!
//! Rules, in evaluation order:
//!
//! 1. Role changes and deletions never target the caller's own account.
//! 2. Admin-only kinds deny non-admins outright.
//! 3. Staff item updates may only carry `quantity`; any other item field
//!    denies the whole request.
//! 4. Own-password updates must target the caller and carry a verified
//!    `currentPassword`.
//! 5. Updates must carry at least one field.
//! 6. Fields outside the kind's writable set are denied individually.

use crate::core::error::AuthorizationError;
use crate::core::field::ProposedFields;
use crate::core::mutation::{MutationKind, MutationRequest, fields};
use crate::core::principal::Role;
use axum::http::StatusCode;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Why (part of) a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    InsufficientRole,
    StaffRestrictedToQuantity,
    NoFieldToUpdate,
    OwnAccount,
    OtherAccount,
    CurrentPasswordIncorrect,
    FieldNotPermitted,
}

impl DenialReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::InsufficientRole => "insufficient role",
            DenialReason::StaffRestrictedToQuantity => "staff restricted to quantity",
            DenialReason::NoFieldToUpdate => "no field to update",
            DenialReason::OwnAccount => "cannot act on own account",
            DenialReason::OtherAccount => "cannot act on another account",
            DenialReason::CurrentPasswordIncorrect => "current password incorrect",
            DenialReason::FieldNotPermitted => "field not permitted",
        }
    }

    /// An empty update is a malformed request; everything else is a refusal
    pub fn status_code(&self) -> StatusCode {
        match self {
            DenialReason::NoFieldToUpdate => StatusCode::BAD_REQUEST,
            _ => StatusCode::FORBIDDEN,
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A single denial, attributed to a field when one is responsible
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub reason: DenialReason,
    pub message: String,
}

impl Denial {
    pub fn new(reason: DenialReason) -> Self {
        Self {
            field: None,
            reason,
            message: reason.message().to_string(),
        }
    }

    pub fn for_field(field: &str, reason: DenialReason) -> Self {
        Self {
            field: Some(field.to_string()),
            reason,
            message: format!("{}: {}", field, reason.message()),
        }
    }
}

/// Overall outcome of a [`Decision`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    PartialDeny,
    Deny,
}

/// Structured output of [`AccessPolicy::authorize`]
///
/// `allowed_fields` and `denied_fields` partition the proposed keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed_fields: BTreeSet<String>,
    pub denied_fields: BTreeSet<String>,
    pub errors: Vec<Denial>,
}

impl Decision {
    fn deny_all(proposed: &ProposedFields, errors: Vec<Denial>) -> Self {
        Self {
            allowed_fields: BTreeSet::new(),
            denied_fields: proposed.keys().map(str::to_string).collect(),
            errors,
        }
    }

    fn deny(proposed: &ProposedFields, reason: DenialReason) -> Self {
        Self::deny_all(proposed, vec![Denial::new(reason)])
    }

    fn partition(proposed: &ProposedFields, writable: &[&str]) -> Self {
        let mut decision = Self::default();
        for key in proposed.keys() {
            if writable.contains(&key) {
                decision.allowed_fields.insert(key.to_string());
            } else {
                decision.denied_fields.insert(key.to_string());
                decision
                    .errors
                    .push(Denial::for_field(key, DenialReason::FieldNotPermitted));
            }
        }
        decision
    }

    pub fn verdict(&self) -> Verdict {
        let refused = !self.denied_fields.is_empty() || !self.errors.is_empty();
        if self.allowed_fields.is_empty() && refused {
            Verdict::Deny
        } else if refused {
            Verdict::PartialDeny
        } else {
            Verdict::Allow
        }
    }

    pub fn is_denied(&self) -> bool {
        self.verdict() == Verdict::Deny
    }

    /// First recorded reason, if any
    pub fn primary_reason(&self) -> Option<DenialReason> {
        self.errors.first().map(|d| d.reason)
    }

    /// Narrow `proposed` to the allowed fields, or fail with the denial reasons
    pub fn permitted(&self, proposed: &ProposedFields) -> Result<ProposedFields, AuthorizationError> {
        if self.is_denied() {
            return Err(AuthorizationError::Denied(self.errors.clone()));
        }
        Ok(proposed.restricted_to(&self.allowed_fields))
    }
}

/// Role-based, field-level mutation policy
///
/// Stateless; one instance can serve any number of concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn authorize(&self, request: &MutationRequest, kind: MutationKind) -> Decision {
        let principal = &request.principal;
        let proposed = &request.proposed;

        if kind.forbids_self_target() && request.target_id == Some(principal.id) {
            return Decision::deny(proposed, DenialReason::OwnAccount);
        }

        if kind.requires_admin() && !principal.is_admin() {
            return Decision::deny(proposed, DenialReason::InsufficientRole);
        }

        if kind == MutationKind::UpdateItem && principal.role == Role::Staff {
            return Self::staff_item_update(proposed);
        }

        if kind == MutationKind::UpdateOwnPassword
            && !request.target_id.is_some_and(|id| principal.is_self(id))
        {
            return Decision::deny(proposed, DenialReason::OtherAccount);
        }

        if kind.is_update() && proposed.is_empty() {
            return Decision::deny(proposed, DenialReason::NoFieldToUpdate);
        }

        if kind == MutationKind::UpdateOwnPassword {
            let verified = proposed.contains(fields::CURRENT_PASSWORD)
                && request.current_password_verified == Some(true);
            if !verified {
                return Decision::deny(proposed, DenialReason::CurrentPasswordIncorrect);
            }
        }

        Decision::partition(proposed, kind.writable_fields())
    }

    fn staff_item_update(proposed: &ProposedFields) -> Decision {
        let restricted: Vec<Denial> = [fields::NAME, fields::DESCRIPTION, fields::PRICE]
            .into_iter()
            .filter(|field| proposed.contains(field))
            .map(|field| Denial::for_field(field, DenialReason::StaffRestrictedToQuantity))
            .collect();

        if !restricted.is_empty() {
            return Decision::deny_all(proposed, restricted);
        }

        if !proposed.contains(fields::QUANTITY) {
            return Decision::deny(proposed, DenialReason::NoFieldToUpdate);
        }

        Decision::partition(proposed, &[fields::QUANTITY])
    }
}
