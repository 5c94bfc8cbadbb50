use serde::{Deserialize, Serialize};

use super::defaults;

/// Sketch encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Number of buckets (centroids).
    pub num_buckets: usize,
    /// Maximum buckets emitted per query.
    pub probes: usize,
    /// Minimum cosine affinity for a bucket to be emitted.
    pub min_affinity: f32,
    /// Per-bucket capacity multiplier over the mean occupancy.
    pub balance_slack: f64,
    /// How many buckets each chunk is listed under in the directory.
    pub assignments_per_chunk: usize,
    /// Balanced k-means iterations.
    pub kmeans_iterations: usize,
    /// Seed for centroid initialization.
    pub seed: u64,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            num_buckets: defaults::DEFAULT_NUM_BUCKETS,
            probes: defaults::DEFAULT_SKETCH_PROBES,
            min_affinity: defaults::DEFAULT_MIN_AFFINITY,
            balance_slack: defaults::DEFAULT_BALANCE_SLACK,
            assignments_per_chunk: defaults::DEFAULT_ASSIGNMENTS_PER_CHUNK,
            kmeans_iterations: defaults::DEFAULT_SKETCH_KMEANS_ITERATIONS,
            seed: defaults::DEFAULT_SKETCH_SEED,
        }
    }
}
