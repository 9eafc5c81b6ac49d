//! Single-entry operation executor.
//!
//! Runs the pre-checks for one operation on one entry, delegates the change
//! to the store and, once the store has confirmed it, refreshes the cache and
//! publishes the matching lifecycle event.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cache::EntryCache;
use super::channel::{EventChannel, LifecycleEvent};
use super::store::JournalStore;
use crate::ledger::{JournalEntry, business_warnings, validate_lines};
use crate::lifecycle::{Actor, EventType, Operation, OperationError, TransitionRules, UserRole};

/// A requested operation with its batch-level arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRequest {
    /// The operation to perform.
    pub operation: Operation,
    /// The user performing it.
    pub actor: Actor,
    /// Free-text reason, required for some operations.
    #[serde(default)]
    pub reason: Option<String>,
    /// Bypass soft business-rule warnings.
    #[serde(default)]
    pub force: bool,
}

impl OperationRequest {
    /// Creates a request without reason or force.
    #[must_use]
    pub const fn new(operation: Operation, actor: Actor) -> Self {
        Self {
            operation,
            actor,
            reason: None,
            force: false,
        }
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the force flag.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// The trimmed reason, `None` when absent or blank.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        TransitionRules::normalize_reason(self.reason.as_deref())
    }
}

/// Everything known about an operation on an entry before running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// Whether the operation needs a reason.
    pub requires_reason: bool,
    /// Hard errors. Force never bypasses these.
    pub errors: Vec<OperationError>,
    /// Soft warnings. Force bypasses these.
    pub warnings: Vec<String>,
}

/// Assess an operation on an entry without running it.
///
/// Collects every hard error and soft warning. The reason is not checked
/// here since it is supplied with the request, not by the entry.
#[must_use]
pub fn assess(entry: &JournalEntry, operation: Operation, actor: &Actor) -> Assessment {
    let verdict = TransitionRules::can_transition(entry.status, operation.target());
    let mut errors = Vec::new();

    if !verdict.allowed {
        errors.push(OperationError::InvalidTransition {
            from: entry.status,
            to: operation.target(),
        });
    }
    if let Err(err) = actor.authorize(operation) {
        errors.push(err);
    }
    errors.extend(balance_error(entry, operation));
    errors.extend(line_error(entry, operation));
    errors.extend(reversal_error(entry, operation));

    Assessment {
        requires_reason: verdict.requires_reason,
        errors,
        warnings: soft_warnings(entry, operation),
    }
}

/// Run the pre-checks for a request, in order, stopping at the first failure.
///
/// Order: transition, role, reason, balance, line shape, existing reversal,
/// then soft warnings unless `force` is set.
///
/// # Errors
///
/// Returns the first failing check as an `OperationError`.
pub fn preflight(
    entry: &JournalEntry,
    request: &OperationRequest,
) -> Result<Option<String>, OperationError> {
    let operation = request.operation;

    TransitionRules::check(entry.status, operation)?;
    request.actor.authorize(operation)?;
    let reason = TransitionRules::require_reason(operation, request.reason.as_deref())?;

    if let Some(err) = balance_error(entry, operation)
        .or_else(|| line_error(entry, operation))
        .or_else(|| reversal_error(entry, operation))
    {
        return Err(err);
    }

    if !request.force {
        let warnings = soft_warnings(entry, operation);
        if !warnings.is_empty() {
            return Err(OperationError::SoftBlocked(warnings));
        }
    }

    Ok(reason)
}

fn balance_error(entry: &JournalEntry, operation: Operation) -> Option<OperationError> {
    if !operation.requires_balance() {
        return None;
    }
    let balance = entry.balance();
    (!balance.is_balanced).then_some(OperationError::Unbalanced {
        total_debit: balance.total_debit,
        total_credit: balance.total_credit,
        difference: balance.difference,
    })
}

fn line_error(entry: &JournalEntry, operation: Operation) -> Option<OperationError> {
    if !operation.checks_lines() {
        return None;
    }
    let issues = validate_lines(&entry.lines);
    (!issues.is_empty())
        .then(|| OperationError::InvalidLines(issues.iter().map(ToString::to_string).collect()))
}

fn reversal_error(entry: &JournalEntry, operation: Operation) -> Option<OperationError> {
    if operation != Operation::Reverse {
        return None;
    }
    entry
        .reversed_by
        .as_ref()
        .map(|reversal| OperationError::AlreadyReversed {
            id: entry.id.clone(),
            reversal: reversal.clone(),
        })
}

fn soft_warnings(entry: &JournalEntry, operation: Operation) -> Vec<String> {
    if !operation.checks_business_rules() {
        return Vec::new();
    }
    business_warnings(entry)
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Applies operations to single entries.
pub struct OperationExecutor<S: JournalStore> {
    store: Arc<S>,
    cache: EntryCache,
    channel: EventChannel,
}

impl<S: JournalStore> OperationExecutor<S> {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(store: Arc<S>, cache: EntryCache, channel: EventChannel) -> Self {
        Self {
            store,
            cache,
            channel,
        }
    }

    /// The persistence collaborator.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The entry cache.
    #[must_use]
    pub const fn cache(&self) -> &EntryCache {
        &self.cache
    }

    /// The event channel.
    #[must_use]
    pub const fn channel(&self) -> &EventChannel {
        &self.channel
    }

    /// Execute an operation on an entry and publish its event.
    ///
    /// For `Reverse` the returned entry is the new reversal.
    ///
    /// # Errors
    ///
    /// Returns the first failing pre-check, or the store's error unchanged.
    pub async fn execute(
        &self,
        entry: &JournalEntry,
        request: &OperationRequest,
    ) -> Result<JournalEntry, OperationError> {
        let (updated, event) = self.apply(entry, request).await?;
        self.channel.emit(&event);
        Ok(updated)
    }

    /// Execute an operation without publishing its event.
    ///
    /// The caller receives the event and decides when to publish it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute`].
    pub async fn apply(
        &self,
        entry: &JournalEntry,
        request: &OperationRequest,
    ) -> Result<(JournalEntry, LifecycleEvent), OperationError> {
        let operation = request.operation;
        let reason = preflight(entry, request)?;

        let updated = match (operation, reason.as_deref()) {
            (Operation::Reverse, Some(reason)) => {
                self.store
                    .create_reversal(&entry.id, reason, &request.actor)
                    .await?
            }
            (Operation::Reverse, None) => return Err(OperationError::MissingReason { operation }),
            (operation, reason) => {
                self.store
                    .transition(&entry.id, operation, reason, &request.actor)
                    .await?
            }
        };

        if operation == Operation::Reverse {
            // The store linked the original to its reversal.
            self.cache.invalidate(&entry.id);
        }
        self.cache.insert(updated.clone());
        debug!(
            entry_id = %entry.id,
            operation = %operation,
            status = %updated.status,
            "Journal entry operation applied"
        );

        let event = LifecycleEvent::new(
            operation.event_type(),
            entry.id.clone(),
            Some(updated.clone()),
        );
        Ok((updated, event))
    }

    /// Delete a draft entry, evict it from the cache and publish `deleted`.
    ///
    /// # Errors
    ///
    /// Returns `CanOnlyDeleteDraft` for non-draft entries, `InsufficientRole`
    /// for viewers, or the store's error unchanged.
    pub async fn delete(&self, entry: &JournalEntry, actor: &Actor) -> Result<(), OperationError> {
        if !entry.is_editable() {
            return Err(OperationError::CanOnlyDeleteDraft {
                id: entry.id.clone(),
                status: entry.status,
            });
        }
        if actor.role < UserRole::Submitter {
            return Err(OperationError::InsufficientRole {
                role: actor.role,
                required: UserRole::Submitter,
            });
        }

        self.store.delete(&entry.id).await?;
        self.cache.invalidate(&entry.id);
        debug!(entry_id = %entry.id, "Journal entry deleted");

        self.channel
            .emit(&LifecycleEvent::new(EventType::Deleted, entry.id.clone(), None));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::InMemoryJournalStore;
    use crate::ledger::Line;
    use crate::lifecycle::EntryStatus;
    use chrono::NaiveDate;
    use journalflow_shared::types::{AccountId, JournalEntryId, UserId};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    fn actor(role: UserRole) -> Actor {
        Actor::new(UserId::new(), role)
    }

    fn lines(debit: Decimal, credit: Decimal) -> Vec<Line> {
        vec![
            Line::debit(AccountId::new(), debit),
            Line::credit(AccountId::new(), credit),
        ]
    }

    fn setup() -> (Arc<InMemoryJournalStore>, OperationExecutor<InMemoryJournalStore>) {
        let store = Arc::new(InMemoryJournalStore::new());
        let executor = OperationExecutor::new(
            Arc::clone(&store),
            EntryCache::new(),
            EventChannel::new(),
        );
        (store, executor)
    }

    fn record(channel: &EventChannel, event_type: EventType) -> Arc<Mutex<Vec<LifecycleEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        channel.on(event_type, move |event| sink.lock().unwrap().push(event.clone()));
        seen
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
    }

    #[test]
    fn test_request_reason_is_trimmed() {
        let request = OperationRequest::new(Operation::Cancel, actor(UserRole::Admin))
            .with_reason("   ");
        assert_eq!(request.reason(), None);

        let request = request.with_reason("  duplicate ");
        assert_eq!(request.reason(), Some("duplicate"));
    }

    #[rstest]
    #[case::invalid_transition(
        EntryStatus::Pending,
        Operation::Post,
        UserRole::Admin,
        Some("close"),
        "INVALID_TRANSITION"
    )]
    #[case::role_too_low(
        EntryStatus::Draft,
        Operation::Post,
        UserRole::Submitter,
        Some("close"),
        "INSUFFICIENT_ROLE"
    )]
    #[case::missing_reason(
        EntryStatus::Draft,
        Operation::Post,
        UserRole::Admin,
        Some("  "),
        "MISSING_REASON"
    )]
    fn test_preflight_order(
        #[case] status: EntryStatus,
        #[case] operation: Operation,
        #[case] role: UserRole,
        #[case] reason: Option<&str>,
        #[case] code: &str,
    ) {
        let mut entry = JournalEntry::draft(
            JournalEntryId::generate(),
            1,
            date(),
            "",
            lines(dec!(100.00), dec!(99.00)),
        );
        entry.status = status;
        let mut request = OperationRequest::new(operation, actor(role));
        request.reason = reason.map(str::to_string);

        let err = preflight(&entry, &request).unwrap_err();
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_force_bypasses_only_soft_warnings() {
        let entry = JournalEntry::draft(
            JournalEntryId::generate(),
            1,
            date(),
            "",
            lines(dec!(10), dec!(10)),
        );
        let request = OperationRequest::new(Operation::Submit, actor(UserRole::Admin));
        assert!(matches!(
            preflight(&entry, &request),
            Err(OperationError::SoftBlocked(_))
        ));
        assert_eq!(preflight(&entry, &request.clone().with_force(true)), Ok(None));

        let unbalanced = JournalEntry::draft(
            JournalEntryId::generate(),
            2,
            date(),
            "",
            lines(dec!(10), dec!(9)),
        );
        let forced_post = OperationRequest::new(Operation::Post, actor(UserRole::Admin))
            .with_reason("close")
            .with_force(true);
        assert!(matches!(
            preflight(&unbalanced, &forced_post),
            Err(OperationError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_assess_collects_everything() {
        let entry = JournalEntry::draft(
            JournalEntryId::generate(),
            1,
            date(),
            "",
            vec![Line::debit(AccountId::new(), dec!(5))],
        );

        let assessment = assess(&entry, Operation::Post, &actor(UserRole::Viewer));

        let codes: Vec<_> = assessment.errors.iter().map(OperationError::error_code).collect();
        assert_eq!(codes, vec!["INSUFFICIENT_ROLE", "UNBALANCED_ENTRY", "INVALID_LINES"]);
        assert!(assessment.requires_reason);
        assert_eq!(assessment.warnings, vec!["Entry has no description".to_string()]);
    }

    #[tokio::test]
    async fn test_execute_updates_cache_and_emits() {
        let (store, executor) = setup();
        let approved = record(executor.channel(), EventType::Approved);
        let entry = store.create_draft(date(), "Accrual", lines(dec!(20), dec!(20)));

        let updated = executor
            .execute(&entry, &OperationRequest::new(Operation::Approve, actor(UserRole::Approver)))
            .await
            .unwrap();

        assert_eq!(updated.status, EntryStatus::Approved);
        assert_eq!(
            executor.cache().get(&entry.id).map(|e| e.status),
            Some(EntryStatus::Approved)
        );
        let events = approved.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entry_id, entry.id);
        assert_eq!(events[0].entry.as_ref().map(|e| e.status), Some(EntryStatus::Approved));
    }

    #[tokio::test]
    async fn test_failed_precheck_makes_no_store_call() {
        let (store, executor) = setup();
        let entry = store.create_draft(date(), "Accrual", lines(dec!(20), dec!(19)));

        let err = executor
            .execute(
                &entry,
                &OperationRequest::new(Operation::Post, actor(UserRole::Admin))
                    .with_reason("close"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "UNBALANCED_ENTRY");
        assert_eq!(store.call_count(), 0);
        assert!(executor.cache().get(&entry.id).is_none());
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced_unchanged() {
        let (store, executor) = setup();
        let updated = record(executor.channel(), EventType::Updated);
        let entry = store.create_draft(date(), "Accrual", lines(dec!(20), dec!(20)));
        store.fail_transport_for(&entry.id, "upstream timed out");

        let err = executor
            .execute(&entry, &OperationRequest::new(Operation::Submit, actor(UserRole::Admin)))
            .await
            .unwrap_err();

        assert_eq!(err, OperationError::Transport("upstream timed out".into()));
        assert_eq!(err.to_string(), "upstream timed out");
        assert!(executor.cache().get(&entry.id).is_none());
        assert!(updated.lock().unwrap().is_empty());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_reverse_returns_reversal() {
        let (store, executor) = setup();
        let reversed = record(executor.channel(), EventType::Reversed);
        let admin = actor(UserRole::Admin);
        let entry = store.create_draft(date(), "Accrual", lines(dec!(20), dec!(20)));
        let posted = executor
            .execute(&entry, &OperationRequest::new(Operation::Post, admin).with_reason("close"))
            .await
            .unwrap();

        let reversal = executor
            .execute(
                &posted,
                &OperationRequest::new(Operation::Reverse, admin).with_reason("error"),
            )
            .await
            .unwrap();

        assert_eq!(reversal.reversal_of, Some(entry.id.clone()));
        assert!(reversal.balance().is_balanced);
        assert!(executor.cache().get(&reversal.id).is_some());
        let events = reversed.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entry_id, entry.id);

        let original = store.snapshot(&entry.id).unwrap();
        let again = executor
            .execute(
                &original,
                &OperationRequest::new(Operation::Reverse, admin).with_reason("again"),
            )
            .await
            .unwrap_err();
        assert_eq!(again.error_code(), "ALREADY_REVERSED");
    }

    #[tokio::test]
    async fn test_reverse_evicts_stale_original() {
        let (store, executor) = setup();
        let admin = actor(UserRole::Admin);
        let entry = store.create_draft(date(), "Accrual", lines(dec!(20), dec!(20)));
        let posted = executor
            .execute(&entry, &OperationRequest::new(Operation::Post, admin).with_reason("close"))
            .await
            .unwrap();
        assert!(executor.cache().get(&entry.id).is_some());

        let reversal = executor
            .execute(
                &posted,
                &OperationRequest::new(Operation::Reverse, admin).with_reason("error"),
            )
            .await
            .unwrap();

        let stored = store.snapshot(&entry.id).unwrap();
        assert_eq!(stored.reversed_by, Some(reversal.id.clone()));
        assert!(executor.cache().get(&entry.id).is_none());
        assert!(executor.cache().get(&reversal.id).is_some());
    }

    #[tokio::test]
    async fn test_delete_draft() {
        let (store, executor) = setup();
        let deleted = record(executor.channel(), EventType::Deleted);
        let entry = store.create_draft(date(), "Accrual", lines(dec!(20), dec!(20)));

        executor
            .delete(&entry, &actor(UserRole::Submitter))
            .await
            .unwrap();

        assert!(store.snapshot(&entry.id).is_none());
        let events = deleted.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].entry.is_none());
    }

    #[tokio::test]
    async fn test_delete_non_draft_is_refused() {
        let (store, executor) = setup();
        let admin = actor(UserRole::Admin);
        let entry = store.create_draft(date(), "Accrual", lines(dec!(20), dec!(20)));
        let pending = executor
            .execute(&entry, &OperationRequest::new(Operation::Submit, admin))
            .await
            .unwrap();

        let err = executor.delete(&pending, &admin).await.unwrap_err();
        assert_eq!(err.error_code(), "CAN_ONLY_DELETE_DRAFT");
        assert!(store.snapshot(&entry.id).is_some());
    }
}
