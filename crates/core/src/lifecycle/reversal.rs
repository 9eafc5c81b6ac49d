//! Reversal builder for voiding posted journal entries.
//!
//! A reversal is a new posted entry whose lines mirror the original's
//! with debits and credits swapped. The original entry keeps its posted
//! status and is linked to the reversal.

use chrono::Utc;
use journalflow_shared::types::{JournalEntryId, LineId};

use super::permissions::Actor;
use super::types::EntryStatus;
use crate::ledger::{AuditStamp, AuditTrail, JournalEntry, Line};

/// Stateless builder for reversing entries.
pub struct ReversalBuilder;

impl ReversalBuilder {
    /// Create reversing lines by swapping debits and credits.
    ///
    /// For each original line:
    /// - Debits become credits
    /// - Credits become debits
    /// - Account, third party and cost center are preserved
    /// - Memo is prefixed with "Reversal: "
    ///
    /// Payment schedules are not carried over.
    #[must_use]
    pub fn reversing_lines(lines: &[Line]) -> Vec<Line> {
        lines
            .iter()
            .map(|line| Line {
                id: LineId::new(),
                account_id: line.account_id,
                debit: line.credit,
                credit: line.debit,
                memo: Some(format!(
                    "Reversal: {}",
                    line.memo.clone().unwrap_or_default()
                )),
                third_party_id: line.third_party_id,
                cost_center_id: line.cost_center_id,
                payment_terms: None,
            })
            .collect()
    }

    /// Build the posted reversing entry for `original`.
    #[must_use]
    pub fn build(
        original: &JournalEntry,
        id: JournalEntryId,
        document_number: u64,
        reason: &str,
        actor: &Actor,
    ) -> JournalEntry {
        let stamp = AuditStamp {
            actor: actor.id,
            at: Utc::now(),
        };
        let mut reversal = JournalEntry {
            id,
            document_number,
            entry_date: Utc::now().date_naive(),
            description: format!(
                "Reversal of entry {}. Reason: {reason}",
                original.document_number
            ),
            currency: original.currency,
            status: EntryStatus::Posted,
            lines: Self::reversing_lines(&original.lines),
            total_debit: original.total_credit,
            total_credit: original.total_debit,
            audit: AuditTrail {
                created: Some(stamp),
                posted: Some(stamp),
                ..AuditTrail::default()
            },
            status_reason: Some(reason.to_string()),
            reversal_of: Some(original.id.clone()),
            reversed_by: None,
        };
        reversal.recompute_totals();
        reversal
    }
}
