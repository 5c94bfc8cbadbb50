//! EmbeddingEngine: provider chain plus content-hash cache.

use pcc_core::config::EmbeddingConfig;
use pcc_core::errors::PccResult;
use pcc_core::models::DegradationEvent;
use pcc_core::traits::IEmbeddingProvider;
use tracing::{debug, info};

use crate::cache::{content_key, L1MemoryCache};
use crate::degradation::DegradationChain;
use crate::providers::HashingEmbedder;

/// Main embedding entry point. Implements `IEmbeddingProvider`.
pub struct EmbeddingEngine {
    chain: DegradationChain,
    cache: L1MemoryCache,
    dimensions: usize,
}

impl EmbeddingEngine {
    /// Engine backed only by the hashing provider.
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self::build(config, None)
    }

    /// Engine that tries `primary` first and falls back to hashing.
    pub fn with_provider(config: &EmbeddingConfig, primary: Box<dyn IEmbeddingProvider>) -> Self {
        Self::build(config, Some(primary))
    }

    fn build(config: &EmbeddingConfig, primary: Option<Box<dyn IEmbeddingProvider>>) -> Self {
        let mut chain = DegradationChain::new();
        if let Some(p) = primary {
            chain.push(p);
        }
        chain.push(Box::new(HashingEmbedder::new(config.dimensions)));

        info!(
            provider = chain.primary_name(),
            dims = config.dimensions,
            "EmbeddingEngine initialized"
        );

        Self {
            chain,
            cache: L1MemoryCache::new(config.l1_cache_size),
            dimensions: config.dimensions,
        }
    }

    /// Embed one text, consulting the cache first.
    pub fn embed_text(&self, text: &str) -> PccResult<Vec<f32>> {
        let key = content_key(text);
        if let Some(vec) = self.cache.get(&key) {
            debug!(key = %&key[..12], "embedding cache hit");
            return Ok(vec);
        }
        let vec = self.chain.embed(text, self.dimensions)?;
        self.cache.insert(key, vec.clone());
        Ok(vec)
    }

    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        self.chain.drain_events()
    }

    pub fn active_provider(&self) -> &str {
        self.chain.primary_name()
    }

    pub fn cache(&self) -> &L1MemoryCache {
        &self.cache
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> PccResult<Vec<f32>> {
        self.embed_text(text)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "embedding-engine"
    }
}
