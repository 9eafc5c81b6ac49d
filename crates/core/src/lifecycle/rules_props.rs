//! Property-based tests for the transition rules.

use proptest::prelude::*;

use super::error::OperationError;
use super::rules::TransitionRules;
use super::types::{EntryStatus, Operation, TargetState};

/// Strategy for generating random `EntryStatus` values.
fn arb_status() -> impl Strategy<Value = EntryStatus> {
    prop::sample::select(EntryStatus::ALL.to_vec())
}

/// Strategy for generating random `TargetState` values.
fn arb_target() -> impl Strategy<Value = TargetState> {
    prop::sample::select(TargetState::ALL.to_vec())
}

/// Strategy for generating random `Operation` values.
fn arb_operation() -> impl Strategy<Value = Operation> {
    prop::sample::select(Operation::ALL.to_vec())
}

/// Strategy for reasons that are empty or whitespace only.
fn arb_blank_reason() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[ \t\n]{0,8}".prop_map(Some)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A disallowed pair never requires a reason.
    #[test]
    fn prop_blocked_pairs_never_require_reason(current in arb_status(), target in arb_target()) {
        let verdict = TransitionRules::can_transition(current, target);
        if !verdict.allowed {
            prop_assert!(!verdict.requires_reason);
        }
    }

    /// An allowed pair requires a reason exactly when the target does.
    #[test]
    fn prop_allowed_pairs_follow_target_reason(current in arb_status(), target in arb_target()) {
        let verdict = TransitionRules::can_transition(current, target);
        if verdict.allowed {
            prop_assert_eq!(verdict.requires_reason, target.requires_reason());
        }
    }

    /// The lookup agrees with the per-status target list.
    #[test]
    fn prop_lookup_matches_allowed_targets(current in arb_status(), target in arb_target()) {
        let listed = TransitionRules::allowed_targets(current).contains(&target);
        prop_assert_eq!(TransitionRules::can_transition(current, target).allowed, listed);
    }

    /// No status can transition to itself.
    #[test]
    fn prop_no_self_transition(current in arb_status()) {
        prop_assert!(!TransitionRules::can_transition(current, TargetState::from(current)).allowed);
    }

    /// `check` fails with InvalidTransition exactly for disallowed pairs.
    #[test]
    fn prop_check_matches_table(current in arb_status(), operation in arb_operation()) {
        let allowed = TransitionRules::can_transition(current, operation.target()).allowed;
        match TransitionRules::check(current, operation) {
            Ok(verdict) => prop_assert!(allowed && verdict.allowed),
            Err(err) => {
                prop_assert!(!allowed);
                prop_assert_eq!(
                    err,
                    OperationError::InvalidTransition { from: current, to: operation.target() }
                );
            }
        }
    }

    /// Blank reasons are rejected for reason-bearing operations only.
    #[test]
    fn prop_blank_reason_rejected_when_required(
        operation in arb_operation(),
        reason in arb_blank_reason()
    ) {
        let result = TransitionRules::require_reason(operation, reason.as_deref());
        if operation.requires_reason() {
            prop_assert_eq!(result, Err(OperationError::MissingReason { operation }));
        } else {
            prop_assert_eq!(result, Ok(None));
        }
    }

    /// Non-blank reasons are always accepted and trimmed.
    #[test]
    fn prop_reason_is_trimmed(operation in arb_operation(), reason in "[a-z]{1,20}") {
        let padded = format!("  {reason}\t");
        let result = TransitionRules::require_reason(operation, Some(&padded));
        prop_assert_eq!(result, Ok(Some(reason)));
    }
}
