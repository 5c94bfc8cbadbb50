//! Retriever: sketch-pruned PQ search with explicit miss handling.

use std::sync::Arc;

use pcc_core::config::{RetrievalConfig, SketchMissMode};
use pcc_core::errors::{PccResult, RetrievalError};
use pcc_core::models::{DegradationEvent, RetrievedSpan};
use pcc_sketch::{SketchBucketDirectory, SketchOutput};
use tracing::{debug, instrument, warn};

use crate::pq::PqIndex;
use crate::ranking::top_k;

/// How often the budget checkpoint runs while scoring candidates.
const CHECKPOINT_EVERY: usize = 1024;

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub spans: Vec<RetrievedSpan>,
    /// True when the sketch selected nothing and the whole corpus was scanned.
    pub degraded: bool,
    pub candidates_scanned: usize,
    /// Directory generation used, as a certificate stamp.
    pub sketch_version: String,
    pub retriever_version: String,
    pub degradation: Option<DegradationEvent>,
}

/// Searches one index/directory pair. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Retriever {
    config: RetrievalConfig,
    index: Arc<PqIndex>,
    directory: Arc<SketchBucketDirectory>,
}

impl Retriever {
    pub fn new(
        config: RetrievalConfig,
        index: Arc<PqIndex>,
        directory: Arc<SketchBucketDirectory>,
    ) -> Self {
        Self {
            config,
            index,
            directory,
        }
    }

    pub fn index(&self) -> &PqIndex {
        &self.index
    }

    pub fn directory(&self) -> &SketchBucketDirectory {
        &self.directory
    }

    /// Top-`k` spans among the candidates listed under `sketch.buckets`.
    pub fn search(&self, sketch: &SketchOutput, query: &[f32], k: usize) -> PccResult<SearchOutcome> {
        self.search_with_checkpoint(sketch, query, k, || Ok(()))
    }

    /// As [`Self::search`], calling `checkpoint` periodically while scoring.
    /// An error from the checkpoint aborts the search.
    #[instrument(skip_all, fields(buckets = sketch.buckets.len(), k = k))]
    pub fn search_with_checkpoint(
        &self,
        sketch: &SketchOutput,
        query: &[f32],
        k: usize,
        mut checkpoint: impl FnMut() -> PccResult<()>,
    ) -> PccResult<SearchOutcome> {
        if sketch.version != self.directory.generation() {
            return Err(RetrievalError::VersionMismatch {
                sketch: sketch.version,
                directory: self.directory.generation(),
            }
            .into());
        }
        let sketch_version = sketch.version_tag();

        let mut candidates = self.directory.candidates(&sketch.buckets)?;
        let mut degradation = None;
        let degraded = candidates.is_empty();
        if degraded {
            match self.config.sketch_miss {
                SketchMissMode::Fail => {
                    return Err(RetrievalError::SketchMiss {
                        sketch_version,
                        buckets: sketch.buckets.len(),
                    }
                    .into());
                }
                SketchMissMode::FullScan => {
                    warn!(
                        sketch_version = %sketch_version,
                        buckets = sketch.buckets.len(),
                        "sketch selected no candidates, falling back to full scan"
                    );
                    candidates = (0..self.index.len()).collect();
                    degradation = Some(DegradationEvent {
                        component: "retrieval".to_string(),
                        failure: format!("sketch miss on {sketch_version}"),
                        fallback_used: "full_scan".to_string(),
                        timestamp: chrono::Utc::now(),
                    });
                }
            }
        }

        let table = self.index.quantizer().lookup_table(query)?;
        let mut scored = Vec::with_capacity(candidates.len());
        for (n, &leaf) in candidates.iter().enumerate() {
            if n % CHECKPOINT_EVERY == 0 {
                checkpoint()?;
            }
            if let Some(s) = self.index.score(&table, leaf) {
                scored.push((leaf, s + self.config.prior_weight * self.index.prior(leaf)));
            }
        }

        let ranked = top_k(scored, k, |i| self.index.meta(i));
        let spans = ranked
            .into_iter()
            .filter_map(|(leaf, score)| {
                self.index.meta(leaf).map(|m| RetrievedSpan {
                    doc_id: m.doc_id.clone(),
                    chunk_id: m.chunk_id,
                    leaf_index: m.leaf_index,
                    offset_range: m.offset_range,
                    similarity_score: score,
                })
            })
            .collect::<Vec<_>>();

        debug!(
            scanned = candidates.len(),
            returned = spans.len(),
            degraded,
            "retrieval complete"
        );

        Ok(SearchOutcome {
            spans,
            degraded,
            candidates_scanned: candidates.len(),
            sketch_version,
            retriever_version: self.index.version_tag(),
            degradation,
        })
    }
}
