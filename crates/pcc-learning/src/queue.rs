//! Bounded feedback queue with an explicit overload policy.

use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use pcc_core::config::OverloadPolicy;
use pcc_core::errors::{LearnerError, PccResult};
use pcc_core::models::FeedbackEvent;
use tracing::{debug, warn};

use crate::stats::LearnerStats;

/// Multi-producer queue in front of the worker pool. `push` never blocks.
pub struct FeedbackQueue {
    sender: Mutex<Option<Sender<FeedbackEvent>>>,
    // Held so `DropOldest` can evict from the producer side.
    evictor: Receiver<FeedbackEvent>,
    capacity: usize,
    policy: OverloadPolicy,
    stats: Arc<LearnerStats>,
}

impl FeedbackQueue {
    /// Create the queue and the receiver the workers drain.
    pub fn new(
        capacity: usize,
        policy: OverloadPolicy,
        stats: Arc<LearnerStats>,
    ) -> (Self, Receiver<FeedbackEvent>) {
        let capacity = capacity.max(1);
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        let queue = Self {
            sender: Mutex::new(Some(tx)),
            evictor: rx.clone(),
            capacity,
            policy,
            stats,
        };
        (queue, rx)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverloadPolicy {
        self.policy
    }

    /// Events currently waiting.
    pub fn len(&self) -> usize {
        self.evictor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evictor.is_empty()
    }

    /// Enqueue `event` without blocking.
    ///
    /// When full, `DropOldest` evicts queued events until the new one fits;
    /// `RejectNew` returns `QueueFull`.
    pub fn push(&self, event: FeedbackEvent) -> PccResult<()> {
        let sender = self
            .sender
            .lock()
            .map_err(|_| LearnerError::Shutdown)?
            .clone()
            .ok_or(LearnerError::Shutdown)?;

        let mut pending = event;
        loop {
            match sender.try_send(pending) {
                Ok(()) => {
                    self.stats.record_enqueued();
                    return Ok(());
                }
                Err(TrySendError::Disconnected(_)) => return Err(LearnerError::Shutdown.into()),
                Err(TrySendError::Full(back)) => match self.policy {
                    OverloadPolicy::RejectNew => {
                        self.stats.record_rejected();
                        debug!(capacity = self.capacity, "feedback rejected");
                        return Err(LearnerError::QueueFull {
                            capacity: self.capacity,
                        }
                        .into());
                    }
                    OverloadPolicy::DropOldest => {
                        // A worker may win the race and empty a slot first.
                        if self.evictor.try_recv().is_ok() {
                            self.stats.record_dropped();
                            warn!(capacity = self.capacity, "learner queue full, dropped oldest feedback");
                        }
                        pending = back;
                    }
                },
            }
        }
    }

    /// Stop accepting feedback. Queued events stay available to workers.
    pub fn close(&self) {
        if let Ok(mut guard) = self.sender.lock() {
            guard.take();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().map(|g| g.is_none()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pcc_core::ErrorKind;

    use super::*;

    fn event(epoch: u64) -> FeedbackEvent {
        FeedbackEvent {
            query_embedding: vec![1.0],
            epoch,
            sketch_version: 1,
            buckets: vec![0],
            num_buckets: 1,
            leaf_count: 1,
            credited: vec![],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn drop_oldest_keeps_newest() {
        let stats = Arc::new(LearnerStats::default());
        let (q, rx) = FeedbackQueue::new(2, OverloadPolicy::DropOldest, Arc::clone(&stats));
        for e in 0..5 {
            q.push(event(e)).unwrap();
        }
        let left: Vec<u64> = rx.try_iter().map(|e| e.epoch).collect();
        assert_eq!(left, vec![3, 4]);
        let s = stats.snapshot();
        assert_eq!(s.enqueued, 5);
        assert_eq!(s.dropped, 3);
    }

    #[test]
    fn reject_new_keeps_oldest() {
        let stats = Arc::new(LearnerStats::default());
        let (q, rx) = FeedbackQueue::new(2, OverloadPolicy::RejectNew, Arc::clone(&stats));
        q.push(event(0)).unwrap();
        q.push(event(1)).unwrap();
        let err = q.push(event(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LearnerOverloaded);
        let left: Vec<u64> = rx.try_iter().map(|e| e.epoch).collect();
        assert_eq!(left, vec![0, 1]);
        assert_eq!(stats.snapshot().rejected, 1);
    }

    #[test]
    fn closed_queue_refuses_but_keeps_backlog() {
        let stats = Arc::new(LearnerStats::default());
        let (q, rx) = FeedbackQueue::new(4, OverloadPolicy::DropOldest, stats);
        q.push(event(0)).unwrap();
        q.close();
        assert!(q.is_closed());
        assert!(q.push(event(1)).is_err());
        assert_eq!(rx.try_iter().count(), 1);
    }
}
