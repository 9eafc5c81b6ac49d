//! Operation error types for journal entry lifecycle management.
//!
//! This module defines all error types that can occur while validating
//! or executing single and bulk lifecycle operations.

use journalflow_shared::types::JournalEntryId;
use rust_decimal::Decimal;
use thiserror::Error;

use super::permissions::UserRole;
use super::types::{EntryStatus, Operation, TargetState};

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The operation needs a reason but none (or only whitespace) was given.
    #[error("A reason is required to {operation}")]
    MissingReason {
        /// The requested operation.
        operation: Operation,
    },

    /// The entry's debits and credits do not balance.
    #[error(
        "Entry is not balanced. Debit: {total_debit}, Credit: {total_credit}, Difference: {difference}"
    )]
    Unbalanced {
        /// Total debit amount.
        total_debit: Decimal,
        /// Total credit amount.
        total_credit: Decimal,
        /// Debit minus credit.
        difference: Decimal,
    },

    /// Attempted a transition that is not in the transition table.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: EntryStatus,
        /// The attempted target.
        to: TargetState,
    },

    /// A bulk request contained no usable ids after normalization.
    #[error("No valid entry ids were provided ({dropped} dropped)")]
    NoValidIds {
        /// Number of raw ids that were dropped.
        dropped: usize,
    },

    /// The entry does not exist.
    #[error("Journal entry {0} not found")]
    EntryNotFound(JournalEntryId),

    /// The persistence collaborator could not be reached.
    #[error("{0}")]
    Transport(String),

    /// The persistence collaborator refused the change.
    #[error("{0}")]
    Rejected(String),

    /// The entry's lines violate double-entry shape rules.
    #[error("Entry lines are invalid: {}", .0.join("; "))]
    InvalidLines(Vec<String>),

    /// Soft business rules block the operation and force was not set.
    #[error("Operation blocked by warnings: {}", .0.join("; "))]
    SoftBlocked(Vec<String>),

    /// The posted entry has already been reversed.
    #[error("Journal entry {id} has already been reversed by {reversal}")]
    AlreadyReversed {
        /// The original entry.
        id: JournalEntryId,
        /// The existing reversal.
        reversal: JournalEntryId,
    },

    /// Only draft entries can be deleted.
    #[error("Can only delete draft entries, {id} is {status}")]
    CanOnlyDeleteDraft {
        /// The entry.
        id: JournalEntryId,
        /// Its current status.
        status: EntryStatus,
    },

    /// The actor's role is too low for the operation.
    #[error("User role {role} does not meet required role {required}")]
    InsufficientRole {
        /// The actor's role.
        role: UserRole,
        /// The role the operation requires.
        required: UserRole,
    },
}

impl OperationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingReason { .. } | Self::NoValidIds { .. } | Self::InvalidTransition { .. } => {
                400
            }

            Self::InsufficientRole { .. } => 403,

            Self::EntryNotFound(_) => 404,

            Self::Unbalanced { .. }
            | Self::Rejected(_)
            | Self::InvalidLines(_)
            | Self::SoftBlocked(_)
            | Self::AlreadyReversed { .. }
            | Self::CanOnlyDeleteDraft { .. } => 422,

            Self::Transport(_) => 502,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingReason { .. } => "MISSING_REASON",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NoValidIds { .. } => "NO_VALID_IDS",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Rejected(_) => "REJECTED",
            Self::InvalidLines(_) => "INVALID_LINES",
            Self::SoftBlocked(_) => "SOFT_BLOCKED",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
            Self::CanOnlyDeleteDraft { .. } => "CAN_ONLY_DELETE_DRAFT",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
        }
    }

    /// Returns true if force could have let the operation through.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::SoftBlocked(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_reason_error() {
        let err = OperationError::MissingReason {
            operation: Operation::Cancel,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "MISSING_REASON");
        assert_eq!(err.to_string(), "A reason is required to cancel");
    }

    #[test]
    fn test_unbalanced_error() {
        let err = OperationError::Unbalanced {
            total_debit: dec!(100.00),
            total_credit: dec!(99.99),
            difference: dec!(0.01),
        };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "UNBALANCED_ENTRY");
        assert!(err.to_string().contains("not balanced"));
        assert!(err.to_string().contains("99.99"));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = OperationError::InvalidTransition {
            from: EntryStatus::Cancelled,
            to: TargetState::Posted,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("cancelled"));
        assert!(err.to_string().contains("posted"));
    }

    #[test]
    fn test_no_valid_ids_error() {
        let err = OperationError::NoValidIds { dropped: 3 };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "NO_VALID_IDS");
    }

    #[test]
    fn test_entry_not_found_error() {
        let id = JournalEntryId::parse("je-9").unwrap();
        let err = OperationError::EntryNotFound(id);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "ENTRY_NOT_FOUND");
        assert_eq!(err.to_string(), "Journal entry je-9 not found");
    }

    #[test]
    fn test_transport_error_passes_message_through() {
        let err = OperationError::Transport("connection reset by peer".to_string());
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.to_string(), "connection reset by peer");
    }

    #[test]
    fn test_list_errors_join_messages() {
        let err = OperationError::SoftBlocked(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Operation blocked by warnings: a; b");
        assert!(err.is_soft());
        assert!(!OperationError::InvalidLines(vec![]).is_soft());
    }
}
