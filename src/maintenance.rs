//! Maintenance
//!
//! Timer-driven background work, modelled without hidden threads: the host
//! owns the timer and calls [`crate::cart::CartEngine::tick`], which consults
//! this schedule. Auto-save re-persists state every 30 seconds as a
//! durability net beyond per-mutation writes; cleanup evicts stale cart
//! lines and history once a day.

use chrono::{DateTime, TimeDelta, Utc};

/// Days after which untouched cart lines and history entries are evicted.
pub const RETENTION_DAYS: i64 = 30;

/// Tracks when auto-save and cleanup last ran.
#[derive(Debug, Clone)]
pub struct MaintenanceSchedule {
    autosave_interval: TimeDelta,
    cleanup_interval: TimeDelta,
    last_autosave: DateTime<Utc>,
    last_cleanup: DateTime<Utc>,
}

impl MaintenanceSchedule {
    /// Create a schedule anchored at `now` with the standard intervals:
    /// auto-save every 30 seconds, cleanup every 24 hours.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            autosave_interval: TimeDelta::seconds(30),
            cleanup_interval: TimeDelta::hours(24),
            last_autosave: now,
            last_cleanup: now,
        }
    }

    /// Whether an auto-save is due at `now`. Marks the save as done when it
    /// is, so the next one is measured from here.
    pub fn autosave_due(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.last_autosave >= self.autosave_interval {
            self.last_autosave = now;
            return true;
        }

        false
    }

    /// Whether a cleanup pass is due at `now`.
    pub fn cleanup_due(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.last_cleanup >= self.cleanup_interval {
            self.last_cleanup = now;
            return true;
        }

        false
    }

    /// The eviction cutoff for a cleanup running at `now`.
    #[must_use]
    pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
        now - TimeDelta::days(RETENTION_DAYS)
    }
}
