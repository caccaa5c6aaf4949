//! Cart History
//!
//! Most-recent-first log of cart changes, capped at 50 entries and persisted
//! under its own key. Entries older than the retention window are evicted by
//! the periodic cleanup.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum number of retained entries.
pub const MAX_ENTRIES: usize = 50;

/// What kind of change produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// A line was added, removed, or changed.
    CartUpdated,

    /// The whole cart was emptied.
    CartCleared,
}

/// One recorded cart change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the change happened.
    pub timestamp: DateTime<Utc>,

    /// What kind of change it was.
    pub action: HistoryAction,

    /// Total quantity after the change.
    pub item_count: u32,

    /// Cart subtotal after the change.
    pub total: Decimal,
}

/// Capped, most-recent-first list of cart changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartHistory {
    entries: Vec<HistoryEntry>,
}

impl CartHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry, dropping the oldest beyond the cap.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries recorded at or before `cutoff`. Returns how many were
    /// evicted.
    pub fn evict_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.timestamp > cutoff);

        before - self.entries.len()
    }
}
