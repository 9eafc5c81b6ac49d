//! Debit/credit balance of a set of journal lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::Line;

/// Largest debit/credit difference still considered balanced (exclusive).
///
/// Fixed at 0.01 to absorb currency rounding; not configurable.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Debit and credit totals of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Sum of all debit amounts.
    pub total_debit: Decimal,
    /// Sum of all credit amounts.
    pub total_credit: Decimal,
    /// `total_debit - total_credit`.
    pub difference: Decimal,
    /// Whether `|difference| < BALANCE_TOLERANCE`.
    pub is_balanced: bool,
}

impl BalanceSummary {
    /// Builds a summary from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        let difference = total_debit - total_credit;
        Self {
            total_debit,
            total_credit,
            difference,
            is_balanced: difference.abs() < BALANCE_TOLERANCE,
        }
    }
}

/// Sums debits and credits independently (lines are not netted).
#[must_use]
pub fn compute_balance(lines: &[Line]) -> BalanceSummary {
    let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
    let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();

    BalanceSummary::new(total_debit, total_credit)
}
