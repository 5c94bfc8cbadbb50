use serde::{Deserialize, Serialize};

use super::defaults;

/// What the retriever does when the selected buckets hold no candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SketchMissMode {
    /// Run an explicit full-corpus scan and mark the result degraded.
    #[default]
    FullScan,
    /// Fail the request with `SketchMiss`.
    Fail,
}

/// Product-quantized retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of PQ subspaces.
    pub pq_subspaces: usize,
    /// Centroids per subspace (at most 256 for 8-bit codes).
    pub pq_centroids: usize,
    /// k-means iterations per subspace.
    pub pq_iterations: usize,
    /// Weight of learned span priors in the final score.
    pub prior_weight: f32,
    /// Behavior on an empty candidate set.
    pub sketch_miss: SketchMissMode,
    /// Seed for codebook training.
    pub seed: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            pq_subspaces: defaults::DEFAULT_PQ_SUBSPACES,
            pq_centroids: defaults::DEFAULT_PQ_CENTROIDS,
            pq_iterations: defaults::DEFAULT_PQ_ITERATIONS,
            prior_weight: defaults::DEFAULT_PRIOR_WEIGHT,
            sketch_miss: SketchMissMode::default(),
            seed: defaults::DEFAULT_PQ_SEED,
        }
    }
}
