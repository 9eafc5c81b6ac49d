//! Normalisation of raw id batches.

use std::collections::HashSet;

use journalflow_shared::types::JournalEntryId;
use serde_json::Value;

/// Ids left after trimming, dropping blanks and removing duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedIds {
    ids: Vec<JournalEntryId>,
    dropped: usize,
    duplicates: usize,
}

impl NormalizedIds {
    /// Normalises a batch of raw ids.
    ///
    /// Keeps the first occurrence of each id, in input order.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Self::default();
        let mut seen = HashSet::new();

        for candidate in raw {
            match JournalEntryId::parse(candidate.as_ref()) {
                Some(id) if seen.insert(id.clone()) => normalized.ids.push(id),
                Some(_) => normalized.duplicates += 1,
                None => normalized.dropped += 1,
            }
        }

        normalized
    }

    /// Normalises a JSON payload.
    ///
    /// Accepts an array (non-string elements are dropped) or a single
    /// string. Any other value is dropped as a whole.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                let strings: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                let mut normalized = Self::from_raw(&strings);
                normalized.dropped += items.len() - strings.len();
                normalized
            }
            Value::String(single) => Self::from_raw([single]),
            _ => Self {
                dropped: 1,
                ..Self::default()
            },
        }
    }

    /// The surviving ids in first-occurrence order.
    #[must_use]
    pub fn ids(&self) -> &[JournalEntryId] {
        &self.ids
    }

    /// Consumes the set and returns the ids.
    #[must_use]
    pub fn into_ids(self) -> Vec<JournalEntryId> {
        self.ids
    }

    /// Number of ids dropped as blank or malformed.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Number of repeated ids removed.
    #[must_use]
    pub const fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Number of surviving ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no ids survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
