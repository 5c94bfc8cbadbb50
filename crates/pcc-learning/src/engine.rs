//! OnlineLearner: queue, worker pool, and lifecycle.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use dashmap::DashMap;
use pcc_core::config::LearnerConfig;
use pcc_core::errors::PccResult;
use pcc_core::models::FeedbackEvent;
use pcc_core::traits::IParameterPublisher;
use tracing::{info, warn};

use crate::privacy::GaussianMechanism;
use crate::queue::FeedbackQueue;
use crate::stats::{LearnerStats, LearnerStatsSnapshot};
use crate::worker::{self, UpdateParams, WorkerContext};

pub struct OnlineLearner {
    queue: FeedbackQueue,
    stats: Arc<LearnerStats>,
    /// Published prior updates per leaf index.
    credits: Arc<DashMap<usize, u64>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl OnlineLearner {
    /// Start `config.workers` threads draining a fresh queue into `publisher`.
    pub fn start(config: &LearnerConfig, publisher: Arc<dyn IParameterPublisher>) -> PccResult<Self> {
        let stats = Arc::new(LearnerStats::default());
        let credits = Arc::new(DashMap::new());
        let (queue, receiver) =
            FeedbackQueue::new(config.queue_capacity, config.overload, Arc::clone(&stats));

        let workers = config.workers.max(1);
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let mechanism = GaussianMechanism::new(
                config.clip_norm,
                config.noise_multiplier,
                config.seed.map(|s| s.wrapping_add(id as u64)),
            )?;
            handles.push(worker::spawn(WorkerContext {
                id,
                receiver: receiver.clone(),
                publisher: Arc::clone(&publisher),
                stats: Arc::clone(&stats),
                credits: Arc::clone(&credits),
                params: UpdateParams::from(config),
                batch_size: config.batch_size.max(1),
                mechanism,
            })?);
        }

        info!(
            workers,
            capacity = queue.capacity(),
            overload = ?queue.policy(),
            sigma = config.noise_multiplier * config.clip_norm,
            "online learner started"
        );
        Ok(Self {
            queue,
            stats,
            credits,
            workers: Mutex::new(handles),
        })
    }

    /// Enqueue feedback. Never blocks.
    pub fn submit(&self, event: FeedbackEvent) -> PccResult<()> {
        self.queue.push(event)
    }

    pub fn stats(&self) -> LearnerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Events waiting in the queue.
    pub fn backlog(&self) -> usize {
        self.queue.len()
    }

    /// Number of credited feedback events for `leaf_index` folded into
    /// published updates.
    pub fn credit_count(&self, leaf_index: usize) -> u64 {
        self.credits.get(&leaf_index).map(|c| *c).unwrap_or(0)
    }

    pub fn is_running(&self) -> bool {
        !self.queue.is_closed()
    }

    /// Stop accepting feedback, let the workers drain the queue, and wait
    /// for them. Idempotent.
    pub fn shutdown(&self) -> LearnerStatsSnapshot {
        self.queue.close();
        let handles = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        };
        if handles.is_empty() {
            return self.stats.snapshot();
        }
        for handle in handles {
            if handle.join().is_err() {
                warn!("learner worker panicked");
            }
        }
        let stats = self.stats.snapshot();
        info!(?stats, "online learner stopped");
        stats
    }
}

impl Drop for OnlineLearner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
