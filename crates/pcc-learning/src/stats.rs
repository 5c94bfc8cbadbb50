//! Lock-free learner counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct LearnerStats {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
    processed: AtomicU64,
    applied_batches: AtomicU64,
    stale_batches: AtomicU64,
    failed_batches: AtomicU64,
}

/// Point-in-time copy of [`LearnerStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LearnerStatsSnapshot {
    pub enqueued: u64,
    /// Evicted by `DropOldest` to make room.
    pub dropped: u64,
    /// Refused by `RejectNew`.
    pub rejected: u64,
    /// Events folded into a batch.
    pub processed: u64,
    pub applied_batches: u64,
    /// Batches refused because the corpus epoch moved on.
    pub stale_batches: u64,
    pub failed_batches: u64,
}

impl LearnerStats {
    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self, events: usize) {
        self.processed.fetch_add(events as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_applied(&self) {
        self.applied_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stale(&self) {
        self.stale_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LearnerStatsSnapshot {
        LearnerStatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            applied_batches: self.applied_batches.load(Ordering::Relaxed),
            stale_batches: self.stale_batches.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
        }
    }
}
