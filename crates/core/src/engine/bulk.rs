//! Bulk validation and execution passes.
//!
//! Both passes normalise the raw ids first, then handle every entry
//! independently: one entry failing never stops the others. Store calls
//! are issued through a buffered stream, so at most `bulk_concurrency`
//! are in flight and results keep the normalised id order.

use futures::stream::{self, StreamExt};
use journalflow_shared::types::JournalEntryId;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::channel::LifecycleEvent;
use super::executor::{OperationRequest, assess};
use super::ids::NormalizedIds;
use super::service::JournalEngine;
use super::store::JournalStore;
use crate::ledger::JournalEntry;
use crate::lifecycle::{Actor, Operation, OperationError};

type Outcome = Result<(JournalEntry, LifecycleEvent), OperationError>;

/// Overall verdict for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No errors and no warnings.
    Proceed,
    /// Only warnings; proceeds with force.
    Warning,
    /// At least one hard error.
    Blocked,
}

/// Result of validating one operation against one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationValidation {
    /// The entry.
    pub entry_id: JournalEntryId,
    /// The requested operation.
    pub operation: Operation,
    /// True when no hard error blocks the operation.
    pub can_proceed: bool,
    /// Whether the operation needs a reason.
    pub requires_reason: bool,
    /// Hard errors.
    pub errors: Vec<String>,
    /// Soft warnings.
    pub warnings: Vec<String>,
    /// Verdict derived from errors and warnings.
    pub verdict: Verdict,
}

impl OperationValidation {
    /// Builds a validation, deriving `can_proceed` and `verdict`.
    #[must_use]
    pub fn new(
        entry_id: JournalEntryId,
        operation: Operation,
        requires_reason: bool,
        errors: Vec<String>,
        warnings: Vec<String>,
    ) -> Self {
        let verdict = if !errors.is_empty() {
            Verdict::Blocked
        } else if !warnings.is_empty() {
            Verdict::Warning
        } else {
            Verdict::Proceed
        };
        Self {
            entry_id,
            operation,
            can_proceed: errors.is_empty(),
            requires_reason,
            errors,
            warnings,
            verdict,
        }
    }
}

/// Verdict counts over a validation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Number of entries validated.
    pub total: usize,
    /// Entries that can proceed as-is.
    pub proceed: usize,
    /// Entries that proceed only with force.
    pub warning: usize,
    /// Entries that cannot proceed.
    pub blocked: usize,
}

impl ValidationSummary {
    /// Counts verdicts.
    #[must_use]
    pub fn from_validations(validations: &[OperationValidation]) -> Self {
        validations
            .iter()
            .fold(Self::default(), |mut summary, validation| {
                summary.total += 1;
                match validation.verdict {
                    Verdict::Proceed => summary.proceed += 1,
                    Verdict::Warning => summary.warning += 1,
                    Verdict::Blocked => summary.blocked += 1,
                }
                summary
            })
    }

    /// Entries that would go through with the given force flag.
    #[must_use]
    pub const fn runnable(&self, force: bool) -> usize {
        if force {
            self.proceed + self.warning
        } else {
            self.proceed
        }
    }
}

/// An entry that failed during a bulk execution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEntry {
    /// The entry.
    pub id: JournalEntryId,
    /// Human-readable failure reason.
    pub reason: String,
    /// Stable machine-readable code.
    pub error_code: String,
}

impl FailedEntry {
    fn new(id: JournalEntryId, err: &OperationError) -> Self {
        Self {
            id,
            reason: err.to_string(),
            error_code: err.error_code().to_string(),
        }
    }
}

/// Outcome of a bulk execution pass.
///
/// `total_succeeded + total_failed == total_requested` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOperationResult {
    operation: Operation,
    total_requested: usize,
    total_succeeded: usize,
    total_failed: usize,
    #[serde(rename = "succeeded_entries")]
    succeeded: Vec<JournalEntry>,
    #[serde(rename = "failed_entries")]
    failed: Vec<FailedEntry>,
}

impl BulkOperationResult {
    fn new(operation: Operation, succeeded: Vec<JournalEntry>, failed: Vec<FailedEntry>) -> Self {
        Self {
            operation,
            total_requested: succeeded.len() + failed.len(),
            total_succeeded: succeeded.len(),
            total_failed: failed.len(),
            succeeded,
            failed,
        }
    }

    /// The operation that was run.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Number of ids processed after normalisation.
    #[must_use]
    pub const fn total_requested(&self) -> usize {
        self.total_requested
    }

    /// Number of entries that went through.
    #[must_use]
    pub const fn total_succeeded(&self) -> usize {
        self.total_succeeded
    }

    /// Number of entries that failed.
    #[must_use]
    pub const fn total_failed(&self) -> usize {
        self.total_failed
    }

    /// The entries as returned by the store. For `Reverse`, the reversals.
    #[must_use]
    pub fn succeeded(&self) -> &[JournalEntry] {
        &self.succeeded
    }

    /// The failed entries with their reasons.
    #[must_use]
    pub fn failed(&self) -> &[FailedEntry] {
        &self.failed
    }

    /// True if every entry went through.
    #[must_use]
    pub const fn is_complete_success(&self) -> bool {
        self.total_failed == 0
    }
}

impl<S: JournalStore> JournalEngine<S> {
    /// Validate an operation against a batch of raw ids without changing anything.
    ///
    /// Entries that cannot be loaded are reported as blocked. An empty
    /// normalised batch yields an empty list.
    pub async fn validate_bulk<I, T>(
        &self,
        raw_ids: I,
        operation: Operation,
        actor: &Actor,
    ) -> Vec<OperationValidation>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.validate_normalized(NormalizedIds::from_raw(raw_ids), operation, actor)
            .await
    }

    /// [`Self::validate_bulk`] over a JSON payload of ids.
    pub async fn validate_bulk_json(
        &self,
        raw_ids: &Value,
        operation: Operation,
        actor: &Actor,
    ) -> Vec<OperationValidation> {
        self.validate_normalized(NormalizedIds::from_json(raw_ids), operation, actor)
            .await
    }

    /// Execute an operation over a batch of raw ids.
    ///
    /// Events for the entries that went through are published after the
    /// whole batch has been processed.
    ///
    /// # Errors
    ///
    /// Fails before any store call with `NoValidIds` if normalisation leaves
    /// nothing, or `MissingReason` if the operation needs a reason and the
    /// request has none. Per-entry failures are reported in the result.
    pub async fn execute_bulk<I, T>(
        &self,
        raw_ids: I,
        request: &OperationRequest,
    ) -> Result<BulkOperationResult, OperationError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.execute_normalized(NormalizedIds::from_raw(raw_ids), request)
            .await
    }

    /// [`Self::execute_bulk`] over a JSON payload of ids.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute_bulk`].
    pub async fn execute_bulk_json(
        &self,
        raw_ids: &Value,
        request: &OperationRequest,
    ) -> Result<BulkOperationResult, OperationError> {
        self.execute_normalized(NormalizedIds::from_json(raw_ids), request)
            .await
    }

    async fn validate_normalized(
        &self,
        ids: NormalizedIds,
        operation: Operation,
        actor: &Actor,
    ) -> Vec<OperationValidation> {
        log_dropped(&ids);

        stream::iter(ids.into_ids())
            .map(move |id| async move {
                match self.store().get(&id).await {
                    Ok(entry) => {
                        let assessment = assess(&entry, operation, actor);
                        OperationValidation::new(
                            id,
                            operation,
                            assessment.requires_reason,
                            assessment.errors.iter().map(ToString::to_string).collect(),
                            assessment.warnings,
                        )
                    }
                    Err(err) => {
                        warn!(entry_id = %id, error = %err, "Journal entry could not be loaded for validation");
                        OperationValidation::new(
                            id,
                            operation,
                            operation.requires_reason(),
                            vec!["Journal entry could not be loaded".to_string()],
                            Vec::new(),
                        )
                    }
                }
            })
            .buffered(self.bulk_concurrency)
            .collect()
            .await
    }

    async fn execute_normalized(
        &self,
        ids: NormalizedIds,
        request: &OperationRequest,
    ) -> Result<BulkOperationResult, OperationError> {
        log_dropped(&ids);
        let operation = request.operation;

        if ids.is_empty() {
            return Err(OperationError::NoValidIds {
                dropped: ids.dropped(),
            });
        }
        if operation.requires_reason() && request.reason().is_none() {
            return Err(OperationError::MissingReason { operation });
        }

        info!(
            operation = %operation,
            count = ids.len(),
            force = request.force,
            "Bulk operation started"
        );

        let outcomes: Vec<(JournalEntryId, Outcome)> = stream::iter(ids.into_ids())
            .map(move |id| async move {
                let outcome = match self.store().get(&id).await {
                    Ok(entry) => self.executor.apply(&entry, request).await,
                    Err(err) => Err(err.into()),
                };
                (id, outcome)
            })
            .buffered(self.bulk_concurrency)
            .collect()
            .await;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut events = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok((entry, event)) => {
                    succeeded.push(entry);
                    events.push(event);
                }
                Err(err) => {
                    warn!(entry_id = %id, error = %err, "Bulk operation failed for entry");
                    failed.push(FailedEntry::new(id, &err));
                }
            }
        }

        for event in &events {
            self.channel().emit(event);
        }

        let result = BulkOperationResult::new(operation, succeeded, failed);
        info!(
            operation = %operation,
            requested = result.total_requested(),
            succeeded = result.total_succeeded(),
            failed = result.total_failed(),
            "Bulk operation finished"
        );
        Ok(result)
    }
}

fn log_dropped(ids: &NormalizedIds) {
    if ids.dropped() > 0 || ids.duplicates() > 0 {
        warn!(
            dropped = ids.dropped(),
            duplicates = ids.duplicates(),
            kept = ids.len(),
            "Ignored malformed or duplicate entry ids"
        );
    }
}
