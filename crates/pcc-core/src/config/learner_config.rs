use serde::{Deserialize, Serialize};

use super::defaults;

/// What the learner queue does when it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverloadPolicy {
    /// Evict the oldest queued feedback to make room.
    #[default]
    DropOldest,
    /// Refuse the new feedback.
    RejectNew,
}

/// Online learner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    pub enabled: bool,
    /// Bounded feedback queue capacity.
    pub queue_capacity: usize,
    pub overload: OverloadPolicy,
    /// Worker threads draining the queue.
    pub workers: usize,
    /// Feedback events folded into one update.
    pub batch_size: usize,
    /// Step size for centroid updates.
    pub learning_rate: f64,
    /// Per-event L2 clipping bound.
    pub clip_norm: f64,
    /// Gaussian noise standard deviation as a multiple of `clip_norm`.
    pub noise_multiplier: f64,
    /// Prior increment per credited span.
    pub prior_step: f64,
    /// Fixed RNG seed for the noise source. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_LEARNER_ENABLED,
            queue_capacity: defaults::DEFAULT_LEARNER_QUEUE_CAPACITY,
            overload: OverloadPolicy::default(),
            workers: defaults::DEFAULT_LEARNER_WORKERS,
            batch_size: defaults::DEFAULT_LEARNER_BATCH_SIZE,
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            clip_norm: defaults::DEFAULT_CLIP_NORM,
            noise_multiplier: defaults::DEFAULT_NOISE_MULTIPLIER,
            prior_step: defaults::DEFAULT_PRIOR_STEP,
            seed: None,
        }
    }
}
