//! Journal entry and line domain types.

use chrono::{DateTime, NaiveDate, Utc};
use journalflow_shared::types::{
    AccountId, CostCenterId, Currency, JournalEntryId, LineId, PaymentTermsId, ThirdPartyId,
    UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::{BalanceSummary, compute_balance};
use crate::lifecycle::EntryStatus;

/// Side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit (increases assets/expenses, decreases liabilities/equity/revenue).
    Debit,
    /// Credit (decreases assets/expenses, increases liabilities/equity/revenue).
    Credit,
}

/// One instalment of a line's payment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentScheduleItem {
    /// 1-based position in the schedule.
    pub sequence: u32,
    /// Days after the entry date the instalment falls due.
    pub offset_days: u32,
    /// Share of the line amount, in percent.
    pub percentage: Decimal,
    /// Computed instalment amount.
    pub amount: Decimal,
    /// Computed due date.
    pub due_date: NaiveDate,
}

/// Payment terms attached to a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTermsRef {
    /// The payment terms definition.
    pub terms_id: PaymentTermsId,
    /// The instalments derived from the terms.
    #[serde(default)]
    pub schedule: Vec<PaymentScheduleItem>,
}

/// A single debit or credit line of a journal entry.
///
/// Exactly one of `debit` and `credit` should be non-zero once the entry is
/// submitted; both being zero is tolerated while drafting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Unique identifier for this line.
    pub id: LineId,
    /// The account affected by this line.
    pub account_id: AccountId,
    /// Debit amount (zero for credit lines).
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount (zero for debit lines).
    #[serde(default)]
    pub credit: Decimal,
    /// Optional line description.
    #[serde(default)]
    pub memo: Option<String>,
    /// Optional customer or supplier.
    #[serde(default)]
    pub third_party_id: Option<ThirdPartyId>,
    /// Optional cost center.
    #[serde(default)]
    pub cost_center_id: Option<CostCenterId>,
    /// Optional payment terms and schedule.
    #[serde(default)]
    pub payment_terms: Option<PaymentTermsRef>,
}

impl Line {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self::with_amounts(account_id, amount, Decimal::ZERO)
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self::with_amounts(account_id, Decimal::ZERO, amount)
    }

    /// Creates a line with explicit debit and credit amounts.
    #[must_use]
    pub fn with_amounts(account_id: AccountId, debit: Decimal, credit: Decimal) -> Self {
        Self {
            id: LineId::new(),
            account_id,
            debit,
            credit,
            memo: None,
            third_party_id: None,
            cost_center_id: None,
            payment_terms: None,
        }
    }

    /// Sets the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Sets the payment terms.
    #[must_use]
    pub fn with_payment_terms(mut self, terms: PaymentTermsRef) -> Self {
        self.payment_terms = Some(terms);
        self
    }

    /// Returns the side of the line, `None` when both or neither side is set.
    #[must_use]
    pub fn side(&self) -> Option<EntrySide> {
        match (self.debit.is_zero(), self.credit.is_zero()) {
            (false, true) => Some(EntrySide::Debit),
            (true, false) => Some(EntrySide::Credit),
            _ => None,
        }
    }

    /// Returns the line amount regardless of side.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.debit + self.credit
    }
}

/// Who did something and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    /// The acting user.
    pub actor: UserId,
    /// When it happened.
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    /// Stamps the current time for an actor.
    #[must_use]
    pub fn now(actor: UserId) -> Self {
        Self {
            actor,
            at: Utc::now(),
        }
    }
}

/// Audit fields of a journal entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrail {
    /// Creation.
    #[serde(default)]
    pub created: Option<AuditStamp>,
    /// Submission for approval.
    #[serde(default)]
    pub submitted: Option<AuditStamp>,
    /// Approval.
    #[serde(default)]
    pub approved: Option<AuditStamp>,
    /// Posting.
    #[serde(default)]
    pub posted: Option<AuditStamp>,
    /// Cancellation.
    #[serde(default)]
    pub cancelled: Option<AuditStamp>,
}

/// A double-entry journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Monotonic document number assigned by the store.
    pub document_number: u64,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Entry description.
    #[serde(default)]
    pub description: String,
    /// Currency of all lines.
    #[serde(default)]
    pub currency: Currency,
    /// Current status.
    pub status: EntryStatus,
    /// Ordered lines.
    #[serde(default)]
    pub lines: Vec<Line>,
    /// Sum of line debits.
    #[serde(default)]
    pub total_debit: Decimal,
    /// Sum of line credits.
    #[serde(default)]
    pub total_credit: Decimal,
    /// Audit stamps.
    #[serde(default)]
    pub audit: AuditTrail,
    /// Reason recorded with the last reason-bearing transition.
    #[serde(default)]
    pub status_reason: Option<String>,
    /// The entry this one reverses.
    #[serde(default)]
    pub reversal_of: Option<JournalEntryId>,
    /// The reversal created from this entry.
    #[serde(default)]
    pub reversed_by: Option<JournalEntryId>,
}

impl JournalEntry {
    /// Creates a draft entry and computes its totals.
    #[must_use]
    pub fn draft(
        id: JournalEntryId,
        document_number: u64,
        entry_date: NaiveDate,
        description: impl Into<String>,
        lines: Vec<Line>,
    ) -> Self {
        let mut entry = Self {
            id,
            document_number,
            entry_date,
            description: description.into(),
            currency: Currency::default(),
            status: EntryStatus::Draft,
            lines,
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            audit: AuditTrail::default(),
            status_reason: None,
            reversal_of: None,
            reversed_by: None,
        };
        entry.recompute_totals();
        entry
    }

    /// Recomputes `total_debit` and `total_credit` from the lines.
    pub fn recompute_totals(&mut self) {
        let balance = compute_balance(&self.lines);
        self.total_debit = balance.total_debit;
        self.total_credit = balance.total_credit;
    }

    /// Computes the balance from the lines, ignoring the stored totals.
    #[must_use]
    pub fn balance(&self) -> BalanceSummary {
        compute_balance(&self.lines)
    }

    /// Returns true if the entry can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    /// Checks the status invariants.
    ///
    /// Posted entries are balanced and carry a posting stamp; drafts carry none.
    #[must_use]
    pub fn satisfies_status_invariants(&self) -> bool {
        match self.status {
            EntryStatus::Posted => self.balance().is_balanced && self.audit.posted.is_some(),
            EntryStatus::Draft => self.audit.posted.is_none(),
            EntryStatus::Pending | EntryStatus::Approved | EntryStatus::Cancelled => true,
        }
    }
}
