//! Actor permissions for lifecycle operations.
//!
//! Roles form a hierarchy; higher roles can perform every operation a
//! lower role can.

use journalflow_shared::types::UserId;
use serde::{Deserialize, Serialize};

use super::error::OperationError;
use super::types::Operation;

/// User role in the organization hierarchy.
///
/// Roles are ordered from lowest to highest privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can only view entries.
    Viewer = 0,
    /// Can create and submit entries.
    Submitter = 1,
    /// Can approve, reject and reset entries.
    Approver = 2,
    /// Can post, cancel and reverse entries.
    Accountant = 3,
    /// Full access.
    Admin = 4,
}

impl UserRole {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "submitter" => Some(Self::Submitter),
            "approver" => Some(Self::Approver),
            "accountant" => Some(Self::Accountant),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Submitter => "submitter",
            Self::Approver => "approver",
            Self::Accountant => "accountant",
            Self::Admin => "admin",
        }
    }

    /// The minimum role allowed to request an operation.
    #[must_use]
    pub const fn required_for(operation: Operation) -> Self {
        match operation {
            Operation::Submit => Self::Submitter,
            Operation::Approve | Operation::ResetToDraft => Self::Approver,
            Operation::Post | Operation::Cancel | Operation::Reverse => Self::Accountant,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The user's identifier, recorded in audit stamps.
    pub id: UserId,
    /// The user's role.
    pub role: UserRole,
}

impl Actor {
    /// Creates a new actor.
    #[must_use]
    pub const fn new(id: UserId, role: UserRole) -> Self {
        Self { id, role }
    }

    /// Check if the actor may request an operation.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InsufficientRole` if the role is too low.
    pub fn authorize(&self, operation: Operation) -> Result<(), OperationError> {
        let required = UserRole::required_for(operation);
        if self.role < required {
            return Err(OperationError::InsufficientRole {
                role: self.role,
                required,
            });
        }
        Ok(())
    }
}
