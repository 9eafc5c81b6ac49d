//! In-memory journal store.
//!
//! A reference implementation of [`JournalStore`] backed by a mutex-guarded
//! map. It assigns document numbers, stamps audit fields and builds
//! reversals, and it can be told to fail for specific ids so callers can
//! exercise their error paths.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use journalflow_shared::types::JournalEntryId;

use super::store::{JournalStore, StoreError};
use crate::ledger::{AuditStamp, JournalEntry, Line};
use crate::lifecycle::{
    Actor, EntryStatus, Operation, OperationError, ReversalBuilder, TransitionRules,
};

#[derive(Debug, Default)]
struct Faults {
    transport: HashMap<JournalEntryId, String>,
    unreadable: HashSet<JournalEntryId>,
    rejected: HashMap<JournalEntryId, String>,
}

/// Journal store that keeps everything in memory.
#[derive(Debug)]
pub struct InMemoryJournalStore {
    entries: Mutex<BTreeMap<JournalEntryId, JournalEntry>>,
    faults: Mutex<Faults>,
    next_document_number: AtomicU64,
    calls: AtomicU64,
    writes: AtomicU64,
}

impl InMemoryJournalStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(Faults::default()),
            next_document_number: AtomicU64::new(1),
            calls: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Creates a store seeded with existing entries.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = JournalEntry>) -> Self {
        let store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    /// Inserts or replaces an entry as-is.
    pub fn insert(&self, entry: JournalEntry) {
        self.next_document_number
            .fetch_max(entry.document_number.saturating_add(1), Ordering::SeqCst);
        self.entries().insert(entry.id.clone(), entry);
    }

    /// Creates a new draft entry with the next document number.
    pub fn create_draft(
        &self,
        entry_date: NaiveDate,
        description: impl Into<String>,
        lines: Vec<Line>,
    ) -> JournalEntry {
        let entry = JournalEntry::draft(
            JournalEntryId::generate(),
            self.next_document_number(),
            entry_date,
            description,
            lines,
        );
        self.entries().insert(entry.id.clone(), entry.clone());
        entry
    }

    /// Returns an entry without counting it as a collaborator call.
    #[must_use]
    pub fn snapshot(&self, id: &JournalEntryId) -> Option<JournalEntry> {
        self.entries().get(id).cloned()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Makes every write for `id` fail with a transport error.
    pub fn fail_transport_for(&self, id: &JournalEntryId, message: impl Into<String>) {
        self.faults().transport.insert(id.clone(), message.into());
    }

    /// Makes reads of `id` fail with a transport error.
    pub fn fail_reads_for(&self, id: &JournalEntryId) {
        self.faults().unreadable.insert(id.clone());
    }

    /// Makes every write for `id` be rejected with `message`.
    pub fn reject_for(&self, id: &JournalEntryId, message: impl Into<String>) {
        self.faults().rejected.insert(id.clone(), message.into());
    }

    /// Total number of collaborator calls made so far.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of mutating collaborator calls made so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn next_document_number(&self) -> u64 {
        self.next_document_number.fetch_add(1, Ordering::SeqCst)
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<JournalEntryId, JournalEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_write(&self, id: &JournalEntryId) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);

        let faults = self.faults();
        if let Some(message) = faults.transport.get(id) {
            return Err(StoreError::Transport(message.clone()));
        }
        if let Some(message) = faults.rejected.get(id) {
            return Err(StoreError::Rejected(message.clone()));
        }
        Ok(())
    }

    fn apply_transition(
        entry: &mut JournalEntry,
        operation: Operation,
        reason: Option<&str>,
        actor: &Actor,
    ) -> Result<(), StoreError> {
        TransitionRules::check(entry.status, operation).map_err(rejected)?;
        let Some(status) = operation.target().resulting_status() else {
            return Err(StoreError::Rejected(format!(
                "{operation} creates a new entry and cannot be applied as a transition"
            )));
        };
        if operation.requires_balance() {
            let balance = entry.balance();
            if !balance.is_balanced {
                return Err(rejected(OperationError::Unbalanced {
                    total_debit: balance.total_debit,
                    total_credit: balance.total_credit,
                    difference: balance.difference,
                }));
            }
        }

        let stamp = AuditStamp::now(actor.id);
        match status {
            EntryStatus::Pending => entry.audit.submitted = Some(stamp),
            EntryStatus::Approved => entry.audit.approved = Some(stamp),
            EntryStatus::Posted => {
                entry.audit.approved.get_or_insert(stamp);
                entry.audit.posted = Some(stamp);
            }
            EntryStatus::Cancelled => entry.audit.cancelled = Some(stamp),
            EntryStatus::Draft => {
                entry.audit.submitted = None;
                entry.audit.approved = None;
                entry.audit.posted = None;
                entry.audit.cancelled = None;
            }
        }

        entry.status = status;
        if let Some(reason) = TransitionRules::normalize_reason(reason) {
            entry.status_reason = Some(reason.to_string());
        }
        entry.recompute_totals();
        Ok(())
    }
}

impl Default for InMemoryJournalStore {
    fn default() -> Self {
        Self::new()
    }
}

fn rejected(err: OperationError) -> StoreError {
    StoreError::Rejected(err.to_string())
}

impl JournalStore for InMemoryJournalStore {
    async fn get(&self, id: &JournalEntryId) -> Result<JournalEntry, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.faults().unreadable.contains(id) {
            return Err(StoreError::Transport(format!(
                "Journal entry {id} could not be read"
            )));
        }
        self.snapshot(id).ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn transition(
        &self,
        id: &JournalEntryId,
        operation: Operation,
        reason: Option<&str>,
        actor: &Actor,
    ) -> Result<JournalEntry, StoreError> {
        self.begin_write(id)?;

        let mut entries = self.entries();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Self::apply_transition(entry, operation, reason, actor)?;
        Ok(entry.clone())
    }

    async fn create_reversal(
        &self,
        id: &JournalEntryId,
        reason: &str,
        actor: &Actor,
    ) -> Result<JournalEntry, StoreError> {
        self.begin_write(id)?;

        let mut entries = self.entries();
        let original = entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        TransitionRules::check(original.status, Operation::Reverse).map_err(rejected)?;
        if let Some(reversal) = &original.reversed_by {
            return Err(rejected(OperationError::AlreadyReversed {
                id: id.clone(),
                reversal: reversal.clone(),
            }));
        }

        let reversal = ReversalBuilder::build(
            original,
            JournalEntryId::generate(),
            self.next_document_number(),
            reason,
            actor,
        );
        if let Some(original) = entries.get_mut(id) {
            original.reversed_by = Some(reversal.id.clone());
        }
        entries.insert(reversal.id.clone(), reversal.clone());
        Ok(reversal)
    }

    async fn delete(&self, id: &JournalEntryId) -> Result<(), StoreError> {
        self.begin_write(id)?;

        let mut entries = self.entries();
        let entry = entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if entry.status != EntryStatus::Draft {
            return Err(rejected(OperationError::CanOnlyDeleteDraft {
                id: id.clone(),
                status: entry.status,
            }));
        }
        entries.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::UserRole;
    use journalflow_shared::types::{AccountId, UserId};
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 30).unwrap()
    }

    fn balanced_lines() -> Vec<Line> {
        vec![
            Line::debit(AccountId::new(), dec!(75.00)),
            Line::credit(AccountId::new(), dec!(75.00)),
        ]
    }

    fn admin() -> Actor {
        Actor::new(UserId::new(), UserRole::Admin)
    }

    #[tokio::test]
    async fn test_document_numbers_are_monotonic() {
        let store = InMemoryJournalStore::new();
        let first = store.create_draft(date(), "First", balanced_lines());
        let second = store.create_draft(date(), "Second", balanced_lines());
        assert!(second.document_number > first.document_number);

        let mut imported = first.clone();
        imported.id = JournalEntryId::parse("imported").unwrap();
        imported.document_number = 40;
        store.insert(imported);
        let third = store.create_draft(date(), "Third", balanced_lines());
        assert_eq!(third.document_number, 41);
    }

    #[tokio::test]
    async fn test_transition_stamps_audit() {
        let store = InMemoryJournalStore::new();
        let actor = admin();
        let entry = store.create_draft(date(), "Rent", balanced_lines());

        let posted = store
            .transition(&entry.id, Operation::Post, Some(" month close "), &actor)
            .await
            .unwrap();

        assert_eq!(posted.status, EntryStatus::Posted);
        assert_eq!(posted.audit.posted.map(|s| s.actor), Some(actor.id));
        assert!(posted.audit.approved.is_some());
        assert_eq!(posted.status_reason.as_deref(), Some("month close"));
        assert!(posted.satisfies_status_invariants());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_to_draft_clears_stamps() {
        let store = InMemoryJournalStore::new();
        let actor = admin();
        let entry = store.create_draft(date(), "Rent", balanced_lines());
        store
            .transition(&entry.id, Operation::Post, Some("close"), &actor)
            .await
            .unwrap();
        store
            .transition(&entry.id, Operation::Cancel, Some("wrong period"), &actor)
            .await
            .unwrap();

        let restored = store
            .transition(&entry.id, Operation::ResetToDraft, Some("restore"), &actor)
            .await
            .unwrap();

        assert_eq!(restored.status, EntryStatus::Draft);
        assert!(restored.audit.posted.is_none());
        assert!(restored.audit.cancelled.is_none());
        assert!(restored.satisfies_status_invariants());
    }

    #[tokio::test]
    async fn test_transition_rejects_invalid_pair() {
        let store = InMemoryJournalStore::new();
        let entry = store.create_draft(date(), "Rent", balanced_lines());

        let err = store
            .transition(&entry.id, Operation::Cancel, Some("x"), &admin())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Rejected(_)));
        assert_eq!(store.snapshot(&entry.id).unwrap().status, EntryStatus::Draft);
    }

    #[tokio::test]
    async fn test_create_reversal_links_entries() {
        let store = InMemoryJournalStore::new();
        let actor = admin();
        let entry = store.create_draft(date(), "Rent", balanced_lines());
        store
            .transition(&entry.id, Operation::Post, Some("close"), &actor)
            .await
            .unwrap();

        let reversal = store
            .create_reversal(&entry.id, "duplicate", &actor)
            .await
            .unwrap();

        let original = store.snapshot(&entry.id).unwrap();
        assert_eq!(original.status, EntryStatus::Posted);
        assert_eq!(original.reversed_by, Some(reversal.id.clone()));
        assert_eq!(reversal.reversal_of, Some(entry.id.clone()));
        assert_eq!(store.len(), 2);

        let again = store.create_reversal(&entry.id, "again", &actor).await;
        assert!(matches!(again, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_delete_only_drafts() {
        let store = InMemoryJournalStore::new();
        let actor = admin();
        let draft = store.create_draft(date(), "Draft", balanced_lines());
        let pending = store.create_draft(date(), "Pending", balanced_lines());
        store
            .transition(&pending.id, Operation::Submit, None, &actor)
            .await
            .unwrap();

        store.delete(&draft.id).await.unwrap();
        assert!(store.snapshot(&draft.id).is_none());

        let err = store.delete(&pending.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(msg) if msg.contains("Can only delete draft")));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = InMemoryJournalStore::new();
        let entry = store.create_draft(date(), "Rent", balanced_lines());
        store.fail_transport_for(&entry.id, "connection reset by peer");

        let err = store
            .transition(&entry.id, Operation::Submit, None, &admin())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Transport("connection reset by peer".into()));
        assert!(store.get(&entry.id).await.is_ok());

        store.fail_reads_for(&entry.id);
        assert!(matches!(store.get(&entry.id).await, Err(StoreError::Transport(_))));
        assert_eq!(store.call_count(), 3);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_entry() {
        let store = InMemoryJournalStore::new();
        let id = JournalEntryId::parse("nope").unwrap();
        assert_eq!(store.get(&id).await, Err(StoreError::NotFound(id.clone())));
    }
}
