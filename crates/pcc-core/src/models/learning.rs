use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::corpus::SpanRef;

/// Reward attached to one span that was retrieved and cited by an accepted claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanCredit {
    pub span: SpanRef,
    pub leaf_index: usize,
    pub reward: f64,
}

/// Feedback from one finished request, queued for the online learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub query_embedding: Vec<f32>,
    /// Corpus epoch the spans belong to.
    pub epoch: u64,
    /// Sketch parameter version used for retrieval.
    pub sketch_version: u64,
    pub buckets: Vec<u32>,
    /// Bucket count of the sketch at `sketch_version`.
    pub num_buckets: u32,
    /// Leaf count of the corpus at `epoch`.
    pub leaf_count: usize,
    pub credited: Vec<SpanCredit>,
    pub timestamp: DateTime<Utc>,
}

/// Per-bucket centroid movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidDelta {
    pub bucket: u32,
    pub delta: Vec<f32>,
}

/// Per-span retriever prior movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorDelta {
    pub leaf_index: usize,
    pub delta: f32,
}

/// A DP-noised parameter delta ready to merge into a new snapshot generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerUpdate {
    pub update_id: String,
    pub epoch: u64,
    pub base_sketch_version: u64,
    pub centroid_deltas: Vec<CentroidDelta>,
    pub prior_deltas: Vec<PriorDelta>,
    /// Number of feedback events folded into this update.
    pub batch_size: usize,
    /// Standard deviation of the Gaussian noise that was added.
    pub noise_scale: f64,
    pub created_at: DateTime<Utc>,
}
