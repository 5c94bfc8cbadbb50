//! Compressed span index: PQ codes, span metadata, learned priors.
//!
//! Raw embeddings are not retained. Prior updates produce a new index version
//! sharing the codes and metadata of the old one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pcc_core::config::defaults::DEFAULT_PRIOR_CLAMP;
use pcc_core::errors::{PccResult, RetrievalError};
use pcc_core::models::{OffsetRange, PriorDelta, SpanRecord, SpanRef};

use super::quantizer::{LookupTable, ProductQuantizer};

/// Per-span metadata needed to rank and report a hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanMeta {
    pub doc_id: String,
    pub chunk_id: u32,
    pub leaf_index: usize,
    pub offset_range: OffsetRange,
    pub updated_at: DateTime<Utc>,
}

impl SpanMeta {
    pub fn span_ref(&self) -> SpanRef {
        SpanRef::new(self.doc_id.clone(), self.chunk_id)
    }
}

impl From<&SpanRecord> for SpanMeta {
    fn from(r: &SpanRecord) -> Self {
        Self {
            doc_id: r.leaf.doc_id.clone(),
            chunk_id: r.leaf.chunk_id,
            leaf_index: r.leaf_index,
            offset_range: r.offset_range,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PqIndex {
    version: u64,
    quantizer: Arc<ProductQuantizer>,
    /// Flat `[leaf][m]` codes.
    codes: Arc<Vec<u8>>,
    meta: Arc<Vec<SpanMeta>>,
    priors: Arc<Vec<f32>>,
}

impl PqIndex {
    /// Encode `embeddings[i]` for `records[i]`. Leaf index `i` must be position `i`.
    pub fn build(
        quantizer: ProductQuantizer,
        records: &[SpanRecord],
        embeddings: &[Vec<f32>],
    ) -> PccResult<Self> {
        if records.len() != embeddings.len() {
            return Err(RetrievalError::DimensionMismatch {
                expected: records.len(),
                actual: embeddings.len(),
            }
            .into());
        }
        let mut codes = Vec::with_capacity(records.len() * quantizer.subspaces());
        for e in embeddings {
            codes.extend(quantizer.encode(e)?);
        }
        Ok(Self {
            version: 1,
            quantizer: Arc::new(quantizer),
            codes: Arc::new(codes),
            meta: Arc::new(records.iter().map(SpanMeta::from).collect()),
            priors: Arc::new(vec![0.0; records.len()]),
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Certificate stamp for this index version.
    pub fn version_tag(&self) -> String {
        format!("pq-m{}-v{}", self.quantizer.subspaces(), self.version)
    }

    pub fn len(&self) -> usize {
        self.meta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    pub fn quantizer(&self) -> &ProductQuantizer {
        &self.quantizer
    }

    pub fn meta(&self, leaf_index: usize) -> Option<&SpanMeta> {
        self.meta.get(leaf_index)
    }

    pub fn prior(&self, leaf_index: usize) -> f32 {
        self.priors.get(leaf_index).copied().unwrap_or(0.0)
    }

    pub fn codes(&self, leaf_index: usize) -> Option<&[u8]> {
        let m = self.quantizer.subspaces();
        self.codes.get(leaf_index * m..(leaf_index + 1) * m)
    }

    /// Lookup-table score for one leaf, without priors.
    pub fn score(&self, table: &LookupTable, leaf_index: usize) -> Option<f32> {
        self.codes(leaf_index).map(|c| table.score(c))
    }

    /// Approximate embeddings for every leaf, reconstructed from codes.
    pub fn decoded_embeddings(&self) -> PccResult<Vec<Vec<f32>>> {
        (0..self.len())
            .map(|i| match self.codes(i) {
                Some(c) => self.quantizer.decode(c),
                None => Ok(vec![0.0; self.quantizer.dimensions()]),
            })
            .collect()
    }

    /// New index version with priors moved by `deltas`, clamped to
    /// `±DEFAULT_PRIOR_CLAMP`. Unknown leaves are ignored.
    pub fn with_prior_deltas(&self, deltas: &[PriorDelta]) -> Self {
        let mut priors = self.priors.as_ref().clone();
        for d in deltas {
            if let Some(p) = priors.get_mut(d.leaf_index) {
                *p = (*p + d.delta).clamp(-DEFAULT_PRIOR_CLAMP, DEFAULT_PRIOR_CLAMP);
            }
        }
        Self {
            version: self.version + 1,
            quantizer: Arc::clone(&self.quantizer),
            codes: Arc::clone(&self.codes),
            meta: Arc::clone(&self.meta),
            priors: Arc::new(priors),
        }
    }

    /// Approximate bytes held per scored candidate, for memory budgets.
    pub fn candidate_bytes(&self) -> usize {
        self.quantizer.subspaces() + std::mem::size_of::<SpanMeta>() + std::mem::size_of::<f32>()
    }
}
