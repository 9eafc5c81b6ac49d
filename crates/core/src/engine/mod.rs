//! Operation engine over a persistence collaborator.
//!
//! # Modules
//!
//! - `store` - Persistence contract and its errors
//! - `memory` - In-memory store
//! - `cache` - Entry cache
//! - `channel` - Lifecycle event channel
//! - `ids` - Id batch normalisation
//! - `executor` - Single-entry executor and pre-checks
//! - `service` - Engine entry point
//! - `bulk` - Bulk validation and execution passes

pub mod bulk;
pub mod cache;
pub mod channel;
pub mod executor;
pub mod ids;
pub mod memory;
pub mod service;
pub mod store;

pub use bulk::{BulkOperationResult, FailedEntry, OperationValidation, ValidationSummary, Verdict};
pub use cache::EntryCache;
pub use channel::{EventChannel, LifecycleEvent, Subscription};
pub use executor::{Assessment, OperationExecutor, OperationRequest, assess, preflight};
pub use ids::NormalizedIds;
pub use memory::InMemoryJournalStore;
pub use service::JournalEngine;
pub use store::{JournalStore, StoreError};
