//! Status transition rules for journal entries.
//!
//! This module implements the core state machine logic: which
//! (current status, target) pairs are allowed and which of them need
//! a reason.

use serde::Serialize;

use super::error::OperationError;
use super::types::{EntryStatus, Operation, TargetState};

/// Outcome of looking up a (current, target) pair in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionVerdict {
    /// Whether the transition is in the table.
    pub allowed: bool,
    /// Whether the transition needs a non-empty reason.
    ///
    /// Always `false` for disallowed pairs.
    pub requires_reason: bool,
}

impl TransitionVerdict {
    const BLOCKED: Self = Self {
        allowed: false,
        requires_reason: false,
    };
}

/// Stateless rules for journal entry status transitions.
pub struct TransitionRules;

impl TransitionRules {
    /// Look up a transition in the table.
    ///
    /// Valid transitions:
    /// - Draft → Pending, Approved, Posted
    /// - Pending → Approved, Draft (reject)
    /// - Approved → Posted, Draft (reset)
    /// - Posted → Cancelled, Reverse
    /// - Cancelled → Draft (restore)
    ///
    /// Every other pair is not allowed. Posted, Cancelled, Reverse and every
    /// Draft target need a reason; Pending and Approved do not.
    #[must_use]
    pub const fn can_transition(current: EntryStatus, target: TargetState) -> TransitionVerdict {
        let allowed = matches!(
            (current, target),
            (
                EntryStatus::Draft,
                TargetState::Pending | TargetState::Approved | TargetState::Posted
            ) | (
                EntryStatus::Pending,
                TargetState::Approved | TargetState::Draft
            ) | (
                EntryStatus::Approved,
                TargetState::Posted | TargetState::Draft
            ) | (
                EntryStatus::Posted,
                TargetState::Cancelled | TargetState::Reverse
            ) | (EntryStatus::Cancelled, TargetState::Draft)
        );

        if allowed {
            TransitionVerdict {
                allowed,
                requires_reason: target.requires_reason(),
            }
        } else {
            TransitionVerdict::BLOCKED
        }
    }

    /// Targets reachable from a status, in table order.
    #[must_use]
    pub const fn allowed_targets(current: EntryStatus) -> &'static [TargetState] {
        match current {
            EntryStatus::Draft => &[
                TargetState::Pending,
                TargetState::Posted,
                TargetState::Approved,
            ],
            EntryStatus::Pending => &[TargetState::Approved, TargetState::Draft],
            EntryStatus::Approved => &[TargetState::Posted, TargetState::Draft],
            EntryStatus::Posted => &[TargetState::Cancelled, TargetState::Reverse],
            EntryStatus::Cancelled => &[TargetState::Draft],
        }
    }

    /// Operations that can be requested on an entry in the given status.
    #[must_use]
    pub fn available_operations(current: EntryStatus) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| Self::can_transition(current, op.target()).allowed)
            .collect()
    }

    /// Check that an operation may be applied to an entry in `current` status.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidTransition` if the pair is not in the table.
    pub fn check(
        current: EntryStatus,
        operation: Operation,
    ) -> Result<TransitionVerdict, OperationError> {
        let verdict = Self::can_transition(current, operation.target());
        if verdict.allowed {
            Ok(verdict)
        } else {
            Err(OperationError::InvalidTransition {
                from: current,
                to: operation.target(),
            })
        }
    }

    /// Trim a reason, treating empty and whitespace-only values as absent.
    #[must_use]
    pub fn normalize_reason(reason: Option<&str>) -> Option<&str> {
        reason.map(str::trim).filter(|r| !r.is_empty())
    }

    /// Resolve the reason for an operation.
    ///
    /// # Returns
    /// * `Ok(Some(reason))` with the trimmed reason when one was given
    /// * `Ok(None)` when none was given and none is needed
    /// * `Err(OperationError::MissingReason)` when one is needed but absent
    pub fn require_reason(
        operation: Operation,
        reason: Option<&str>,
    ) -> Result<Option<String>, OperationError> {
        match Self::normalize_reason(reason) {
            Some(reason) => Ok(Some(reason.to_string())),
            None if operation.requires_reason() => Err(OperationError::MissingReason { operation }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EntryStatus::Draft, TargetState::Pending, false)]
    #[case(EntryStatus::Draft, TargetState::Approved, false)]
    #[case(EntryStatus::Draft, TargetState::Posted, true)]
    #[case(EntryStatus::Pending, TargetState::Approved, false)]
    #[case(EntryStatus::Pending, TargetState::Draft, true)]
    #[case(EntryStatus::Approved, TargetState::Posted, true)]
    #[case(EntryStatus::Approved, TargetState::Draft, true)]
    #[case(EntryStatus::Posted, TargetState::Cancelled, true)]
    #[case(EntryStatus::Posted, TargetState::Reverse, true)]
    #[case(EntryStatus::Cancelled, TargetState::Draft, true)]
    fn test_table_transitions_allowed(
        #[case] from: EntryStatus,
        #[case] to: TargetState,
        #[case] requires_reason: bool,
    ) {
        let verdict = TransitionRules::can_transition(from, to);
        assert!(verdict.allowed);
        assert_eq!(verdict.requires_reason, requires_reason);
    }

    #[rstest]
    #[case(EntryStatus::Draft, TargetState::Draft)]
    #[case(EntryStatus::Draft, TargetState::Cancelled)]
    #[case(EntryStatus::Draft, TargetState::Reverse)]
    #[case(EntryStatus::Pending, TargetState::Posted)]
    #[case(EntryStatus::Approved, TargetState::Cancelled)]
    #[case(EntryStatus::Posted, TargetState::Draft)]
    #[case(EntryStatus::Posted, TargetState::Posted)]
    #[case(EntryStatus::Cancelled, TargetState::Posted)]
    #[case(EntryStatus::Cancelled, TargetState::Reverse)]
    fn test_pairs_outside_table_blocked(#[case] from: EntryStatus, #[case] to: TargetState) {
        let verdict = TransitionRules::can_transition(from, to);
        assert!(!verdict.allowed);
        assert!(!verdict.requires_reason);
    }

    #[test]
    fn test_draft_to_posted_needs_reason() {
        let verdict = TransitionRules::can_transition(EntryStatus::Draft, TargetState::Posted);
        assert_eq!(
            verdict,
            TransitionVerdict {
                allowed: true,
                requires_reason: true,
            }
        );
    }

    #[test]
    fn test_allowed_targets_agree_with_table() {
        for status in EntryStatus::ALL {
            for target in TargetState::ALL {
                assert_eq!(
                    TransitionRules::allowed_targets(status).contains(&target),
                    TransitionRules::can_transition(status, target).allowed,
                    "{status} -> {target}"
                );
            }
        }
    }

    #[test]
    fn test_available_operations() {
        assert_eq!(
            TransitionRules::available_operations(EntryStatus::Posted),
            vec![Operation::Cancel, Operation::Reverse]
        );
        assert_eq!(
            TransitionRules::available_operations(EntryStatus::Cancelled),
            vec![Operation::ResetToDraft]
        );
    }

    #[test]
    fn test_check_rejects_invalid_operation() {
        let result = TransitionRules::check(EntryStatus::Pending, Operation::Cancel);
        assert!(matches!(
            result,
            Err(OperationError::InvalidTransition {
                from: EntryStatus::Pending,
                to: TargetState::Cancelled,
            })
        ));
    }

    #[test]
    fn test_require_reason_whitespace_is_absent() {
        let result = TransitionRules::require_reason(Operation::Cancel, Some("   "));
        assert!(matches!(
            result,
            Err(OperationError::MissingReason {
                operation: Operation::Cancel
            })
        ));
    }

    #[test]
    fn test_require_reason_trims() {
        let result = TransitionRules::require_reason(Operation::Post, Some("  month close "));
        assert_eq!(result.unwrap(), Some("month close".to_string()));
    }

    #[test]
    fn test_require_reason_optional_for_submit_and_approve() {
        assert_eq!(
            TransitionRules::require_reason(Operation::Submit, None).unwrap(),
            None
        );
        assert_eq!(
            TransitionRules::require_reason(Operation::Approve, Some(" ")).unwrap(),
            None
        );
    }
}
