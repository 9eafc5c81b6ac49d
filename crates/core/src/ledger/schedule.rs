//! Payment schedule derivation from instalment terms.

use chrono::{Days, NaiveDate};
use journalflow_shared::types::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::PaymentScheduleItem;

/// One instalment of a payment terms definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentTerm {
    /// Days after the start date the instalment falls due.
    pub offset_days: u32,
    /// Share of the total, in percent.
    pub percentage: Decimal,
}

impl InstallmentTerm {
    /// Creates a new instalment term.
    #[must_use]
    pub const fn new(offset_days: u32, percentage: Decimal) -> Self {
        Self {
            offset_days,
            percentage,
        }
    }
}

/// Builds the payment schedule for an amount.
///
/// Each instalment is rounded to the currency's minor units. The last
/// instalment takes the rounding remainder so the schedule always adds
/// up to the full amount when the percentages cover 100%.
#[must_use]
pub fn build_schedule(
    terms: &[InstallmentTerm],
    total: Money,
    start: NaiveDate,
) -> Vec<PaymentScheduleItem> {
    let mut allocated = Decimal::ZERO;
    let last = terms.len().saturating_sub(1);
    let complete = term_percentages(terms) == Decimal::ONE_HUNDRED;

    terms
        .iter()
        .enumerate()
        .map(|(index, term)| {
            let amount = if index == last && complete {
                total.amount - allocated
            } else {
                Money::new(total.amount * term.percentage / Decimal::ONE_HUNDRED, total.currency)
                    .rounded()
                    .amount
            };
            allocated += amount;

            PaymentScheduleItem {
                sequence: u32::try_from(index + 1).unwrap_or(u32::MAX),
                offset_days: term.offset_days,
                percentage: term.percentage,
                amount,
                due_date: start
                    .checked_add_days(Days::new(u64::from(term.offset_days)))
                    .unwrap_or(start),
            }
        })
        .collect()
}

fn term_percentages(terms: &[InstallmentTerm]) -> Decimal {
    terms.iter().map(|t| t.percentage).sum()
}
