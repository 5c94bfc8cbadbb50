//! Provider fallback chain.
//!
//! Providers are tried in order; every fallback past the first is recorded as
//! a `DegradationEvent` and logged.

use std::sync::Mutex;

use chrono::Utc;
use pcc_core::errors::{PccError, PccResult};
use pcc_core::models::DegradationEvent;
use pcc_core::traits::IEmbeddingProvider;
use tracing::warn;

/// Ordered list of providers with fallback bookkeeping.
#[derive(Default)]
pub struct DegradationChain {
    chain: Vec<Box<dyn IEmbeddingProvider>>,
    events: Mutex<Vec<DegradationEvent>>,
}

impl DegradationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.chain.push(provider);
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Name of the highest-priority provider.
    pub fn primary_name(&self) -> &str {
        self.chain.first().map(|p| p.name()).unwrap_or("none")
    }

    /// Embed with the first provider that succeeds and returns `dims` values.
    pub fn embed(&self, text: &str, dims: usize) -> PccResult<Vec<f32>> {
        let mut last_error = None;

        for (i, provider) in self.chain.iter().enumerate() {
            let result = provider.embed(text).and_then(|v| {
                if v.len() == dims {
                    Ok(v)
                } else {
                    Err(PccError::EmbeddingError {
                        reason: format!(
                            "{} returned {} dimensions, expected {dims}",
                            provider.name(),
                            v.len()
                        ),
                    })
                }
            });

            match result {
                Ok(vec) => {
                    if i > 0 {
                        self.record(provider.name());
                    }
                    return Ok(vec);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "embedding provider failed, trying next in chain"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PccError::EmbeddingError {
            reason: "no embedding providers configured".to_string(),
        }))
    }

    fn record(&self, fallback: &str) {
        let event = DegradationEvent {
            component: "embeddings".to_string(),
            failure: format!("{} unavailable", self.primary_name()),
            fallback_used: fallback.to_string(),
            timestamp: Utc::now(),
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    /// Take all recorded degradation events.
    pub fn drain_events(&self) -> Vec<DegradationEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}
