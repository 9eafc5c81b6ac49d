//! Persistence contract for journal entries.

use std::future::Future;

use journalflow_shared::types::JournalEntryId;
use thiserror::Error;

use crate::ledger::JournalEntry;
use crate::lifecycle::{Actor, Operation, OperationError};

/// Failures reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No entry with this id exists.
    #[error("Journal entry {0} not found")]
    NotFound(JournalEntryId),

    /// The store refused the change.
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("{0}")]
    Transport(String),
}

impl From<StoreError> for OperationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::EntryNotFound(id),
            StoreError::Rejected(message) => Self::Rejected(message),
            StoreError::Transport(message) => Self::Transport(message),
        }
    }
}

/// Repository trait for journal entry persistence.
///
/// Implementations perform the state change itself; callers are expected to
/// have validated the request beforehand.
pub trait JournalStore: Send + Sync {
    /// Load an entry by id.
    fn get(
        &self,
        id: &JournalEntryId,
    ) -> impl Future<Output = Result<JournalEntry, StoreError>> + Send;

    /// Move an entry to the status targeted by `operation`.
    fn transition(
        &self,
        id: &JournalEntryId,
        operation: Operation,
        reason: Option<&str>,
        actor: &Actor,
    ) -> impl Future<Output = Result<JournalEntry, StoreError>> + Send;

    /// Create the posted reversal of a posted entry and return it.
    fn create_reversal(
        &self,
        id: &JournalEntryId,
        reason: &str,
        actor: &Actor,
    ) -> impl Future<Output = Result<JournalEntry, StoreError>> + Send;

    /// Remove a draft entry.
    fn delete(&self, id: &JournalEntryId) -> impl Future<Output = Result<(), StoreError>> + Send;
}
