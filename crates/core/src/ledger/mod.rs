//! Journal entries, balance checks and line validation.

pub mod balance;
pub mod entry;
pub mod schedule;
pub mod validation;

#[cfg(test)]
mod balance_props;

pub use balance::{BALANCE_TOLERANCE, BalanceSummary, compute_balance};
pub use entry::{
    AuditStamp, AuditTrail, EntrySide, JournalEntry, Line, PaymentScheduleItem, PaymentTermsRef,
};
pub use schedule::{InstallmentTerm, build_schedule};
pub use validation::{BusinessWarning, LineIssue, business_warnings, validate_lines};
