//! Journal engine: the entry point for single and bulk operations.

use std::sync::Arc;

use journalflow_shared::EngineConfig;
use journalflow_shared::types::JournalEntryId;

use super::cache::EntryCache;
use super::channel::EventChannel;
use super::executor::{OperationExecutor, OperationRequest};
use super::store::JournalStore;
use crate::ledger::JournalEntry;
use crate::lifecycle::{Actor, OperationError};

/// Coordinates the executor, cache and event channel over one store.
pub struct JournalEngine<S: JournalStore> {
    pub(super) executor: OperationExecutor<S>,
    pub(super) bulk_concurrency: usize,
}

impl<S: JournalStore> JournalEngine<S> {
    /// Creates an engine over a store, publishing on `channel`.
    #[must_use]
    pub fn new(store: Arc<S>, channel: EventChannel, config: &EngineConfig) -> Self {
        Self {
            executor: OperationExecutor::new(store, EntryCache::from_config(config), channel),
            bulk_concurrency: config.bulk_concurrency.max(1),
        }
    }

    /// Creates an engine with default configuration and a fresh channel.
    #[must_use]
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, EventChannel::new(), &EngineConfig::default())
    }

    /// The single-entry executor.
    #[must_use]
    pub const fn executor(&self) -> &OperationExecutor<S> {
        &self.executor
    }

    /// The persistence collaborator.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        self.executor.store()
    }

    /// The entry cache.
    #[must_use]
    pub const fn cache(&self) -> &EntryCache {
        self.executor.cache()
    }

    /// The event channel.
    #[must_use]
    pub const fn channel(&self) -> &EventChannel {
        self.executor.channel()
    }

    /// Maximum number of in-flight store calls during a bulk pass.
    #[must_use]
    pub const fn bulk_concurrency(&self) -> usize {
        self.bulk_concurrency
    }

    /// Load an entry and execute one operation on it.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the entry cannot be loaded, otherwise
    /// whatever [`OperationExecutor::execute`] returns.
    pub async fn execute(
        &self,
        id: &JournalEntryId,
        request: &OperationRequest,
    ) -> Result<JournalEntry, OperationError> {
        let entry = self.store().get(id).await?;
        self.executor.execute(&entry, request).await
    }

    /// Load an entry and delete it if it is a draft.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the entry cannot be loaded, otherwise
    /// whatever [`OperationExecutor::delete`] returns.
    pub async fn delete(&self, id: &JournalEntryId, actor: &Actor) -> Result<(), OperationError> {
        let entry = self.store().get(id).await?;
        self.executor.delete(&entry, actor).await
    }
}
