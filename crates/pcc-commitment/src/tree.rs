//! Binary Merkle tree over leaf hashes.
//!
//! Levels are stored bottom-up without padding; a missing right sibling on an
//! odd-width level is read as `empty_node()`.

use pcc_core::constants::MAX_PROOF_DEPTH;
use pcc_core::errors::{CommitmentError, PccResult};
use pcc_core::Hash32;

use crate::hashing::{empty_node, hash_node};

/// Number of levels above the leaves for a tree of `leaf_count` leaves.
pub fn tree_depth(leaf_count: usize) -> usize {
    let mut width = leaf_count;
    let mut depth = 0;
    while width > 1 {
        width = width.div_ceil(2);
        depth += 1;
    }
    depth
}

/// Width of `level` in a tree of `leaf_count` leaves.
pub(crate) fn level_width(leaf_count: usize, level: usize) -> usize {
    let mut width = leaf_count;
    for _ in 0..level {
        width = width.div_ceil(2);
    }
    width
}

#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build from leaf hashes. Fails on zero leaves.
    pub fn from_leaves(leaves: Vec<Hash32>) -> PccResult<Self> {
        if leaves.is_empty() {
            return Err(CommitmentError::EmptyCorpus.into());
        }
        let mut levels = vec![leaves];
        while let Some(top) = levels.last() {
            if top.len() <= 1 {
                break;
            }
            let next: Vec<Hash32> = top
                .chunks(2)
                .map(|pair| {
                    let right = pair.get(1).copied().unwrap_or_else(empty_node);
                    hash_node(&pair[0], &right)
                })
                .collect();
            levels.push(next);
        }
        Ok(Self { levels })
    }

    pub fn root(&self) -> Hash32 {
        self.levels
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or(Hash32::ZERO)
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn leaf(&self, index: usize) -> Option<Hash32> {
        self.levels.first().and_then(|l| l.get(index)).copied()
    }

    /// Hash at `(level, index)`, with out-of-width positions reading as padding.
    pub(crate) fn node(&self, level: usize, index: usize) -> Hash32 {
        self.levels
            .get(level)
            .and_then(|l| l.get(index))
            .copied()
            .unwrap_or_else(empty_node)
    }

    /// Sibling hashes from the leaf level up to just below the root.
    pub fn get_proof(&self, leaf_index: usize) -> PccResult<Vec<Hash32>> {
        let leaf_count = self.leaf_count();
        if leaf_index >= leaf_count {
            return Err(CommitmentError::LeafOutOfRange {
                index: leaf_index,
                leaf_count,
            }
            .into());
        }
        let mut branch = Vec::with_capacity(self.depth());
        let mut idx = leaf_index;
        for level in 0..self.depth() {
            branch.push(self.node(level, idx ^ 1));
            idx /= 2;
        }
        Ok(branch)
    }
}

/// Check that `leaf_hash` sits at `index` under `root`.
///
/// The branch length must equal the depth implied by `leaf_count`, which pins
/// the leaf's position and rules out proofs for interior nodes.
pub fn verify_proof(
    root: &Hash32,
    leaf_hash: &Hash32,
    index: usize,
    leaf_count: usize,
    branch: &[Hash32],
) -> bool {
    if index >= leaf_count || branch.len() > MAX_PROOF_DEPTH {
        return false;
    }
    if branch.len() != tree_depth(leaf_count) {
        return false;
    }
    let mut acc = *leaf_hash;
    let mut idx = index;
    for sibling in branch {
        acc = if idx % 2 == 0 {
            hash_node(&acc, sibling)
        } else {
            hash_node(sibling, &acc)
        };
        idx /= 2;
    }
    acc == *root
}
