//! Token-level coverage of a claim by its cited spans.

use std::collections::HashSet;
use std::sync::Arc;

use crate::tokenizer::{tokenize, TokenCache};

/// Share of `claim_tokens` found in at least one of `support`.
///
/// Repeated claim tokens count once per occurrence. No tokens means no
/// coverage.
pub fn token_coverage<S: AsRef<HashSet<String>>>(claim_tokens: &[String], support: &[S]) -> f64 {
    if claim_tokens.is_empty() {
        return 0.0;
    }
    let covered = claim_tokens
        .iter()
        .filter(|t| support.iter().any(|s| s.as_ref().contains(t.as_str())))
        .count();
    covered as f64 / claim_tokens.len() as f64
}

/// Coverage with span token sets served from a [`TokenCache`].
pub struct CoverageScorer {
    cache: TokenCache,
}

impl CoverageScorer {
    pub fn new(cache_size: u64) -> Self {
        Self {
            cache: TokenCache::new(cache_size),
        }
    }

    /// Coverage of `claim` by the union of `span_texts`.
    pub fn coverage<T: AsRef<str>>(&self, claim: &str, span_texts: &[T]) -> f64 {
        let sets: Vec<Arc<HashSet<String>>> = span_texts
            .iter()
            .map(|t| self.cache.token_set(t.as_ref()))
            .collect();
        token_coverage(&tokenize(claim), &sets)
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }
}
