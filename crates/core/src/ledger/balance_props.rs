//! Property-based tests for the balance validator.

use journalflow_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{BALANCE_TOLERANCE, compute_balance};
use super::entry::Line;

/// Strategy for generating amounts with up to three decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64, 0u32..=3u32).prop_map(|(n, scale)| Decimal::new(n, scale))
}

/// Strategy for generating a line with any debit/credit combination.
fn arb_line() -> impl Strategy<Value = Line> {
    (arb_amount(), arb_amount(), any::<bool>(), any::<bool>()).prop_map(
        |(debit, credit, keep_debit, keep_credit)| {
            Line::with_amounts(
                AccountId::new(),
                if keep_debit { debit } else { Decimal::ZERO },
                if keep_credit { credit } else { Decimal::ZERO },
            )
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Difference is exactly debit minus credit.
    #[test]
    fn prop_difference_is_exact(lines in prop::collection::vec(arb_line(), 0..12)) {
        let summary = compute_balance(&lines);
        prop_assert_eq!(summary.total_debit - summary.total_credit, summary.difference);
    }

    /// Balanced iff the absolute difference is strictly below the tolerance.
    #[test]
    fn prop_balanced_iff_below_tolerance(lines in prop::collection::vec(arb_line(), 0..12)) {
        let summary = compute_balance(&lines);
        prop_assert_eq!(summary.is_balanced, summary.difference.abs() < BALANCE_TOLERANCE);
    }

    /// Totals are independent sums of each side.
    #[test]
    fn prop_totals_are_side_sums(lines in prop::collection::vec(arb_line(), 0..12)) {
        let summary = compute_balance(&lines);
        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit).sum();
        prop_assert_eq!(summary.total_debit, debit);
        prop_assert_eq!(summary.total_credit, credit);
    }

    /// Mirroring every line into its opposite side always balances.
    #[test]
    fn prop_mirrored_lines_balance(amounts in prop::collection::vec(arb_amount(), 1..8)) {
        let lines: Vec<Line> = amounts
            .iter()
            .flat_map(|a| [Line::debit(AccountId::new(), *a), Line::credit(AccountId::new(), *a)])
            .collect();
        prop_assert!(compute_balance(&lines).is_balanced);
    }
}
