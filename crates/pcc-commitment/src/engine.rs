//! CommitmentBuilder: documents in, committed epoch out.

use std::collections::HashMap;

use pcc_core::config::CommitmentConfig;
use pcc_core::errors::{CommitmentError, PccResult};
use pcc_core::models::{CorpusLeaf, Document, MultiProof, SpanRecord, SpanRef};
use pcc_core::Hash32;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::chunker::chunk_text;
use crate::hashing::{hash_leaf, span_hash};
use crate::multiproof::build_multiproof;
use crate::tree::MerkleTree;

/// An immutable committed corpus state.
#[derive(Debug, Clone)]
pub struct CorpusCommitment {
    epoch: u64,
    tree: MerkleTree,
    records: Vec<SpanRecord>,
    by_ref: HashMap<SpanRef, usize>,
}

impl CorpusCommitment {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn root(&self) -> Hash32 {
        self.tree.root()
    }

    pub fn leaf_count(&self) -> usize {
        self.records.len()
    }

    /// Committed leaves in tree order.
    pub fn leaves(&self) -> impl Iterator<Item = &CorpusLeaf> {
        self.records.iter().map(|r| &r.leaf)
    }

    /// Span records in tree order; `records()[i].leaf_index == i`.
    pub fn records(&self) -> &[SpanRecord] {
        &self.records
    }

    pub fn record(&self, leaf_index: usize) -> Option<&SpanRecord> {
        self.records.get(leaf_index)
    }

    pub fn leaf_hash(&self, leaf_index: usize) -> Option<Hash32> {
        self.tree.leaf(leaf_index)
    }

    pub fn index_of(&self, span: &SpanRef) -> Option<usize> {
        self.by_ref.get(span).copied()
    }

    pub fn get_proof(&self, leaf_index: usize) -> PccResult<Vec<Hash32>> {
        self.tree.get_proof(leaf_index)
    }

    pub fn multiproof(&self, indices: &[usize]) -> PccResult<MultiProof> {
        build_multiproof(&self.tree, indices)
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }
}

/// Builds corpus commitments from documents.
pub struct CommitmentBuilder {
    config: CommitmentConfig,
}

impl CommitmentBuilder {
    pub fn new(config: CommitmentConfig) -> Self {
        Self { config }
    }

    /// Chunk, hash, and commit `documents` as `epoch`.
    ///
    /// Documents are processed in `doc_id` order, so input order does not
    /// affect the root. Fails with `EmptyCorpus` when no spans result.
    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub fn commit(&self, documents: &[Document], epoch: u64) -> PccResult<CorpusCommitment> {
        if documents.is_empty() {
            return Err(CommitmentError::EmptyCorpus.into());
        }

        let mut sorted: Vec<&Document> = documents.iter().collect();
        sorted.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
        if let Some(pair) = sorted.windows(2).find(|w| w[0].doc_id == w[1].doc_id) {
            return Err(CommitmentError::DuplicateDocument {
                doc_id: pair[0].doc_id.clone(),
            }
            .into());
        }

        let mut records = Vec::new();
        for doc in sorted {
            for (chunk_id, range) in chunk_text(&doc.text, self.config.max_chunk_bytes)
                .into_iter()
                .enumerate()
            {
                let text = doc.text[range.start..range.end].to_string();
                let leaf = CorpusLeaf {
                    doc_id: doc.doc_id.clone(),
                    chunk_id: chunk_id as u32,
                    span_hash: span_hash(&text),
                };
                records.push(SpanRecord {
                    leaf,
                    leaf_index: records.len(),
                    offset_range: range,
                    text,
                    updated_at: doc.updated_at,
                });
            }
        }
        if records.is_empty() {
            return Err(CommitmentError::EmptyCorpus.into());
        }

        let hash = |r: &SpanRecord| hash_leaf(&r.leaf.doc_id, r.leaf.chunk_id, &r.leaf.span_hash);
        let leaf_hashes: Vec<Hash32> = if records.len() >= self.config.parallel_threshold {
            debug!(leaves = records.len(), "hashing leaves in parallel");
            records.par_iter().map(hash).collect()
        } else {
            records.iter().map(hash).collect()
        };

        let tree = MerkleTree::from_leaves(leaf_hashes)?;
        let by_ref = records
            .iter()
            .map(|r| (r.leaf.span_ref(), r.leaf_index))
            .collect();

        info!(
            epoch,
            leaves = records.len(),
            depth = tree.depth(),
            root = %tree.root(),
            "corpus committed"
        );

        Ok(CorpusCommitment {
            epoch,
            tree,
            records,
            by_ref,
        })
    }
}
