use serde::{Deserialize, Serialize};

use super::defaults;

/// Claim verifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Per-claim entailment time budget.
    pub timeout_ms: u64,
    /// Span token-set cache capacity.
    pub token_cache_size: u64,
    /// Entailment worker threads. Also the number of calls that may wait
    /// for a free worker; beyond that, claims fail closed.
    pub scorer_threads: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            timeout_ms: defaults::DEFAULT_VERIFIER_TIMEOUT_MS,
            token_cache_size: defaults::DEFAULT_TOKEN_CACHE_SIZE,
            scorer_threads: defaults::DEFAULT_SCORER_THREADS,
        }
    }
}
