//! Line shape and business rule validation for journal entries.

use rust_decimal::Decimal;
use thiserror::Error;

use super::balance::BALANCE_TOLERANCE;
use super::entry::{JournalEntry, Line};

/// Minimum number of lines a submitted entry must have.
pub const MIN_LINES: usize = 2;

/// Hard line shape violations. Never bypassed by force.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineIssue {
    /// Entry has fewer than two lines.
    #[error("Entry must have at least {MIN_LINES} lines, found {count}")]
    TooFewLines {
        /// Number of lines found.
        count: usize,
    },

    /// Line sets both a debit and a credit.
    #[error("Line {line} has both a debit and a credit")]
    BothSides {
        /// 1-based line number.
        line: usize,
    },

    /// Line sets neither a debit nor a credit.
    #[error("Line {line} has neither a debit nor a credit")]
    NeitherSide {
        /// 1-based line number.
        line: usize,
    },

    /// Line has a negative amount.
    #[error("Line {line} has a negative amount")]
    NegativeAmount {
        /// 1-based line number.
        line: usize,
    },
}

/// Soft business rule findings. Block operations unless force is set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusinessWarning {
    /// Entry has no description.
    #[error("Entry has no description")]
    MissingDescription,

    /// Payment schedule percentages do not add up to 100.
    #[error("Payment schedule of line {line} covers {total}% instead of 100%")]
    SchedulePercentage {
        /// 1-based line number.
        line: usize,
        /// Sum of the schedule percentages.
        total: Decimal,
    },

    /// Payment schedule amounts do not add up to the line amount.
    #[error("Payment schedule of line {line} totals {scheduled}, line amount is {expected}")]
    ScheduleAmount {
        /// 1-based line number.
        line: usize,
        /// The line amount.
        expected: Decimal,
        /// Sum of the schedule amounts.
        scheduled: Decimal,
    },
}

/// Validates line shape for submission.
///
/// Returns every violation found, in line order.
#[must_use]
pub fn validate_lines(lines: &[Line]) -> Vec<LineIssue> {
    let mut issues = Vec::new();

    if lines.len() < MIN_LINES {
        issues.push(LineIssue::TooFewLines { count: lines.len() });
    }

    for (index, line) in lines.iter().enumerate() {
        let number = index + 1;
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            issues.push(LineIssue::NegativeAmount { line: number });
            continue;
        }
        match (line.debit.is_zero(), line.credit.is_zero()) {
            (false, false) => issues.push(LineIssue::BothSides { line: number }),
            (true, true) => issues.push(LineIssue::NeitherSide { line: number }),
            _ => {}
        }
    }

    issues
}

/// Evaluates soft business rules for an entry.
#[must_use]
pub fn business_warnings(entry: &JournalEntry) -> Vec<BusinessWarning> {
    let mut warnings = Vec::new();

    if entry.description.trim().is_empty() {
        warnings.push(BusinessWarning::MissingDescription);
    }

    for (index, line) in entry.lines.iter().enumerate() {
        let Some(terms) = &line.payment_terms else {
            continue;
        };
        if terms.schedule.is_empty() {
            continue;
        }

        let number = index + 1;
        let total: Decimal = terms.schedule.iter().map(|s| s.percentage).sum();
        if total != Decimal::ONE_HUNDRED {
            warnings.push(BusinessWarning::SchedulePercentage {
                line: number,
                total,
            });
        }

        let scheduled: Decimal = terms.schedule.iter().map(|s| s.amount).sum();
        if (scheduled - line.amount()).abs() >= BALANCE_TOLERANCE {
            warnings.push(BusinessWarning::ScheduleAmount {
                line: number,
                expected: line.amount(),
                scheduled,
            });
        }
    }

    warnings
}
