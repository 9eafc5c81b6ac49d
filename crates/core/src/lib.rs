//! Core business logic for Journalflow.
//!
//! This crate contains the journal entry lifecycle with ZERO UI or transport
//! dependencies. Persistence is reached through the [`engine::JournalStore`]
//! trait.
//!
//! # Modules
//!
//! - `ledger` - Journal entries, balance checks and line validation
//! - `lifecycle` - Status transitions, permissions and reversals
//! - `engine` - Single and bulk operation execution, cache and events

pub mod engine;
pub mod ledger;
pub mod lifecycle;
