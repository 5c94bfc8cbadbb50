use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::corpus::{OffsetRange, SpanRef};
use super::hash::Hash32;

/// One span bound into a certificate, with its inclusion branch unless the
/// certificate proves membership through a multi-proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertifiedSpan {
    pub doc_id: String,
    pub chunk_id: u32,
    pub offset_range: OffsetRange,
    pub span_hash: Hash32,
    pub leaf_index: usize,
    /// Sibling hashes ordered from the leaf level up to just below the root.
    /// Empty when the certificate carries a multi-proof.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch: Vec<Hash32>,
}

impl CertifiedSpan {
    pub fn span_ref(&self) -> SpanRef {
        SpanRef::new(self.doc_id.clone(), self.chunk_id)
    }
}

/// A node in a compacted multi-proof, addressed by tree position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    /// 0 = leaf level.
    pub level: u32,
    pub index: u64,
    pub hash: Hash32,
}

/// Shared-ancestor compressed proof for several leaves at once.
///
/// `nodes` is an arena of exactly the sibling hashes that cannot be derived
/// from the proven leaves, sorted by `(level, index)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiProof {
    pub leaf_indices: Vec<usize>,
    pub nodes: Vec<ProofNode>,
}

/// Self-contained, externally verifiable bundle binding retrieved spans to a
/// committed corpus root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageCertificate {
    pub certificate_id: String,
    pub root: Hash32,
    pub epoch: u64,
    pub leaf_count: usize,
    /// Canonical order: ascending `leaf_index`, no duplicates.
    pub spans: Vec<CertifiedSpan>,
    pub tau: f64,
    pub sketch_version: String,
    pub retriever_version: String,
    pub snapshot_generation: u64,
    /// True when retrieval fell back to a full-corpus scan.
    pub degraded: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiproof: Option<MultiProof>,
    /// blake3 over the canonical encoding of every other field.
    pub digest: Hash32,
}

impl CoverageCertificate {
    /// Index into `spans` of the span at `leaf_index`, if certified.
    pub fn position_of(&self, leaf_index: usize) -> Option<usize> {
        self.spans
            .binary_search_by_key(&leaf_index, |s| s.leaf_index)
            .ok()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
