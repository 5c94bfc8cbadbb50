use serde::{Deserialize, Serialize};

use super::defaults;

/// Corpus commitment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitmentConfig {
    /// Maximum span length in bytes.
    pub max_chunk_bytes: usize,
    /// Leaf count above which leaf hashing runs in parallel.
    pub parallel_threshold: usize,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: defaults::DEFAULT_MAX_CHUNK_BYTES,
            parallel_threshold: defaults::DEFAULT_PARALLEL_HASH_THRESHOLD,
        }
    }
}
