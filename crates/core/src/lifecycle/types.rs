//! Lifecycle domain types for journal entry status management.
//!
//! Every status-keyed table in the engine is an exhaustive `match` over
//! these closed enums, so adding a status is a compile error until every
//! table handles it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Journal entry status in the lifecycle.
///
/// The valid transitions are:
/// - Draft → Pending (submit)
/// - Draft → Approved, Draft → Posted (direct approval and posting)
/// - Pending → Approved (approve)
/// - Pending → Draft (reject)
/// - Approved → Posted (post)
/// - Approved → Draft (reset)
/// - Posted → Cancelled (cancel)
/// - Posted → reverse (creates a new entry)
/// - Cancelled → Draft (restore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted and can be modified.
    Draft,
    /// Entry has been submitted for approval.
    Pending,
    /// Entry has been approved and is ready for posting.
    Approved,
    /// Entry has been posted to the ledger.
    Posted,
    /// Posted entry has been cancelled.
    Cancelled,
}

impl EntryStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Pending,
        Self::Approved,
        Self::Posted,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Posted => "posted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "posted" => Some(Self::Posted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the entry's lines can be modified.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a requested transition.
///
/// The five statuses plus the `Reverse` pseudo-target, which creates a new
/// entry instead of moving the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    /// Back to draft (reject, reset or restore).
    Draft,
    /// Submitted for approval.
    Pending,
    /// Approved.
    Approved,
    /// Posted to the ledger.
    Posted,
    /// Cancelled.
    Cancelled,
    /// Reversed through a new negating entry.
    Reverse,
}

impl TargetState {
    /// All targets.
    pub const ALL: [Self; 6] = [
        Self::Draft,
        Self::Pending,
        Self::Approved,
        Self::Posted,
        Self::Cancelled,
        Self::Reverse,
    ];

    /// Returns the string representation of the target.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Posted => "posted",
            Self::Cancelled => "cancelled",
            Self::Reverse => "reverse",
        }
    }

    /// Returns true if moving to this target needs a non-empty reason.
    #[must_use]
    pub const fn requires_reason(&self) -> bool {
        match self {
            Self::Draft | Self::Posted | Self::Cancelled | Self::Reverse => true,
            Self::Pending | Self::Approved => false,
        }
    }

    /// Returns the status an entry ends up in, `None` for `Reverse`.
    #[must_use]
    pub const fn resulting_status(&self) -> Option<EntryStatus> {
        match self {
            Self::Draft => Some(EntryStatus::Draft),
            Self::Pending => Some(EntryStatus::Pending),
            Self::Approved => Some(EntryStatus::Approved),
            Self::Posted => Some(EntryStatus::Posted),
            Self::Cancelled => Some(EntryStatus::Cancelled),
            Self::Reverse => None,
        }
    }
}

impl From<EntryStatus> for TargetState {
    fn from(status: EntryStatus) -> Self {
        match status {
            EntryStatus::Draft => Self::Draft,
            EntryStatus::Pending => Self::Pending,
            EntryStatus::Approved => Self::Approved,
            EntryStatus::Posted => Self::Posted,
            EntryStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation requested by a user on one or many entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Submit a draft for approval.
    Submit,
    /// Approve a draft or pending entry.
    Approve,
    /// Post a draft or approved entry.
    Post,
    /// Cancel a posted entry.
    Cancel,
    /// Create a reversing entry for a posted entry.
    Reverse,
    /// Send an entry back to draft (reject, reset or restore).
    ResetToDraft,
}

impl Operation {
    /// All operations.
    pub const ALL: [Self; 6] = [
        Self::Submit,
        Self::Approve,
        Self::Post,
        Self::Cancel,
        Self::Reverse,
        Self::ResetToDraft,
    ];

    /// Returns the string representation of the operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Post => "post",
            Self::Cancel => "cancel",
            Self::Reverse => "reverse",
            Self::ResetToDraft => "reset_to_draft",
        }
    }

    /// Parses an operation from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "submit" => Some(Self::Submit),
            "approve" => Some(Self::Approve),
            "post" => Some(Self::Post),
            "cancel" => Some(Self::Cancel),
            "reverse" => Some(Self::Reverse),
            "reset_to_draft" | "reset" | "draft" => Some(Self::ResetToDraft),
            _ => None,
        }
    }

    /// The transition target of this operation.
    #[must_use]
    pub const fn target(&self) -> TargetState {
        match self {
            Self::Submit => TargetState::Pending,
            Self::Approve => TargetState::Approved,
            Self::Post => TargetState::Posted,
            Self::Cancel => TargetState::Cancelled,
            Self::Reverse => TargetState::Reverse,
            Self::ResetToDraft => TargetState::Draft,
        }
    }

    /// Returns true if the operation needs a non-empty reason.
    #[must_use]
    pub const fn requires_reason(&self) -> bool {
        self.target().requires_reason()
    }

    /// Returns true if the entry must be balanced for this operation.
    #[must_use]
    pub const fn requires_balance(&self) -> bool {
        matches!(self, Self::Approve | Self::Post)
    }

    /// Returns true if line shape is checked for this operation.
    #[must_use]
    pub const fn checks_lines(&self) -> bool {
        matches!(self, Self::Submit | Self::Approve | Self::Post)
    }

    /// Returns true if soft business rules are evaluated for this operation.
    #[must_use]
    pub const fn checks_business_rules(&self) -> bool {
        !matches!(self, Self::ResetToDraft)
    }

    /// The lifecycle event published after the operation succeeds.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Approve => EventType::Approved,
            Self::Post => EventType::Posted,
            Self::Cancel => EventType::Cancelled,
            Self::Reverse => EventType::Reversed,
            Self::Submit | Self::ResetToDraft => EventType::Updated,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of lifecycle event delivered through the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Entry was approved.
    Approved,
    /// Entry was posted.
    Posted,
    /// Entry was cancelled.
    Cancelled,
    /// A reversal was created for the entry.
    Reversed,
    /// Entry changed status without a dedicated event.
    Updated,
    /// Draft entry was deleted.
    Deleted,
}

impl EventType {
    /// Returns the string representation of the event type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Posted => "posted",
            Self::Cancelled => "cancelled",
            Self::Reversed => "reversed",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
