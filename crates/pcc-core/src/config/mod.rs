pub mod defaults;

mod commitment_config;
mod embedding_config;
mod learner_config;
mod observability_config;
mod retrieval_config;
mod sketch_config;
mod verifier_config;

pub use commitment_config::CommitmentConfig;
pub use embedding_config::EmbeddingConfig;
pub use learner_config::{LearnerConfig, OverloadPolicy};
pub use observability_config::ObservabilityConfig;
pub use retrieval_config::{RetrievalConfig, SketchMissMode};
pub use sketch_config::SketchConfig;
pub use verifier_config::VerifierConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{PccError, PccResult};

/// Top-level engine configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PccConfig {
    pub commitment: CommitmentConfig,
    pub embedding: EmbeddingConfig,
    pub sketch: SketchConfig,
    pub retrieval: RetrievalConfig,
    pub verifier: VerifierConfig,
    pub learner: LearnerConfig,
    pub observability: ObservabilityConfig,
}

impl PccConfig {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml(s: &str) -> PccResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| PccError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> PccResult<()> {
        let fail = |msg: String| Err(PccError::ConfigError(msg));

        if self.commitment.max_chunk_bytes == 0 {
            return fail("commitment.max_chunk_bytes must be > 0".into());
        }
        if self.embedding.dimensions == 0 {
            return fail("embedding.dimensions must be > 0".into());
        }
        if self.retrieval.pq_subspaces == 0
            || self.embedding.dimensions % self.retrieval.pq_subspaces != 0
        {
            return fail(format!(
                "embedding.dimensions ({}) must be divisible by retrieval.pq_subspaces ({})",
                self.embedding.dimensions, self.retrieval.pq_subspaces
            ));
        }
        if self.retrieval.pq_centroids == 0 || self.retrieval.pq_centroids > 256 {
            return fail("retrieval.pq_centroids must be in 1..=256".into());
        }
        if self.sketch.num_buckets == 0 || self.sketch.num_buckets > u32::MAX as usize {
            return fail("sketch.num_buckets must be > 0".into());
        }
        if self.sketch.probes == 0 {
            return fail("sketch.probes must be > 0".into());
        }
        if self.sketch.assignments_per_chunk == 0
            || self.sketch.assignments_per_chunk > self.sketch.num_buckets
        {
            return fail("sketch.assignments_per_chunk must be in 1..=num_buckets".into());
        }
        if self.sketch.balance_slack < 1.0 {
            return fail("sketch.balance_slack must be >= 1.0".into());
        }
        if self.verifier.scorer_threads == 0 {
            return fail("verifier.scorer_threads must be > 0".into());
        }
        if self.learner.queue_capacity == 0 {
            return fail("learner.queue_capacity must be > 0".into());
        }
        if self.learner.workers == 0 || self.learner.batch_size == 0 {
            return fail("learner.workers and learner.batch_size must be > 0".into());
        }
        if self.learner.clip_norm <= 0.0 || self.learner.noise_multiplier < 0.0 {
            return fail("learner.clip_norm must be > 0 and noise_multiplier >= 0".into());
        }
        Ok(())
    }
}
