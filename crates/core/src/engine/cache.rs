//! Journal entry caching using Moka.
//!
//! Holds the last confirmed copy of each entry the executor has touched.
//! Only confirmed persistence results are ever written here.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

use journalflow_shared::EngineConfig;
use journalflow_shared::types::JournalEntryId;

use crate::ledger::JournalEntry;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache of journal entries keyed by id.
///
/// Thread-safe and cheap to clone; clones share the same storage.
#[derive(Clone)]
pub struct EntryCache {
    cache: Cache<JournalEntryId, Arc<JournalEntry>>,
}

impl EntryCache {
    /// Creates a new entry cache with default settings.
    ///
    /// Default: 1000 entries max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a new entry cache with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of entries to cache
    /// * `ttl_secs` - Time-to-live in seconds for each entry
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Creates a cache sized from the engine configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_config(config.cache_capacity, config.cache_ttl_secs)
    }

    /// Returns the cached copy of an entry, if any.
    #[must_use]
    pub fn get(&self, id: &JournalEntryId) -> Option<Arc<JournalEntry>> {
        self.cache.get(id)
    }

    /// Stores the confirmed copy of an entry.
    pub fn insert(&self, entry: JournalEntry) {
        self.cache.insert(entry.id.clone(), Arc::new(entry));
    }

    /// Evicts a single entry.
    pub fn invalidate(&self, id: &JournalEntryId) {
        self.cache.invalidate(id);
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    ///
    /// Moka updates this count lazily; call [`Self::run_pending_tasks`]
    /// first when an exact figure is needed.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for EntryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
