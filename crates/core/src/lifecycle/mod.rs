//! Journal entry lifecycle rules.
//!
//! This module implements the status state machine:
//! - Transition table and reason requirements
//! - Role requirements per operation
//! - Reversal of posted entries
//!
//! ## Status Flow
//!
//! ```text
//! draft → pending → approved → posted → cancelled → draft
//!   │                  ↑          │
//!   └──────────────────┘          └→ reverse (new posted entry)
//! ```

pub mod error;
pub mod permissions;
pub mod reversal;
pub mod rules;
pub mod types;

#[cfg(test)]
mod rules_props;

pub use error::OperationError;
pub use permissions::{Actor, UserRole};
pub use reversal::ReversalBuilder;
pub use rules::{TransitionRules, TransitionVerdict};
pub use types::{EntryStatus, EventType, Operation, TargetState};
