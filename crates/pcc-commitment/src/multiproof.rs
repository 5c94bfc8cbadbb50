//! Shared-ancestor multi-proofs.
//!
//! The proof is a flat arena of `(level, index, hash)` entries holding exactly
//! the siblings that cannot be derived from the proven leaves. Padding
//! siblings past the end of a level are implied and never stored.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pcc_core::errors::{CommitmentError, PccResult};
use pcc_core::models::{MultiProof, ProofNode};
use pcc_core::Hash32;

use crate::hashing::{empty_node, hash_node};
use crate::tree::{level_width, tree_depth, MerkleTree};

fn malformed(reason: impl Into<String>) -> CommitmentError {
    CommitmentError::MalformedProof {
        reason: reason.into(),
    }
}

/// Build a multi-proof for `indices` (any order, duplicates ignored).
pub fn build_multiproof(tree: &MerkleTree, indices: &[usize]) -> PccResult<MultiProof> {
    let leaf_count = tree.leaf_count();
    let known: BTreeSet<usize> = indices.iter().copied().collect();
    if let Some(&bad) = known.iter().find(|&&i| i >= leaf_count) {
        return Err(CommitmentError::LeafOutOfRange {
            index: bad,
            leaf_count,
        }
        .into());
    }

    let leaf_indices: Vec<usize> = known.iter().copied().collect();
    let mut nodes = Vec::new();
    let mut level_known = known;

    for level in 0..tree.depth() {
        let width = level_width(leaf_count, level);
        for &idx in &level_known {
            let sibling = idx ^ 1;
            if sibling < width && !level_known.contains(&sibling) {
                nodes.push(ProofNode {
                    level: level as u32,
                    index: sibling as u64,
                    hash: tree.node(level, sibling),
                });
            }
        }
        level_known = level_known.iter().map(|i| i / 2).collect();
    }

    Ok(MultiProof {
        leaf_indices,
        nodes,
    })
}

/// Re-derive the root from `(leaf_index, leaf_hash)` pairs and the proof arena.
///
/// `leaves` must cover exactly `proof.leaf_indices`. Every arena node must be
/// consumed; extra or missing nodes are malformed.
pub fn verify_multiproof(
    root: &Hash32,
    leaf_count: usize,
    leaves: &[(usize, Hash32)],
    proof: &MultiProof,
) -> Result<(), CommitmentError> {
    if leaves.is_empty() {
        return Err(malformed("no leaves"));
    }
    let mut current: BTreeMap<usize, Hash32> = BTreeMap::new();
    for &(idx, hash) in leaves {
        if idx >= leaf_count {
            return Err(CommitmentError::LeafOutOfRange {
                index: idx,
                leaf_count,
            });
        }
        current.insert(idx, hash);
    }
    let claimed: Vec<usize> = current.keys().copied().collect();
    if claimed != proof.leaf_indices {
        return Err(malformed("leaf set does not match proof"));
    }

    let mut arena: HashMap<(u32, u64), Hash32> = HashMap::with_capacity(proof.nodes.len());
    for node in &proof.nodes {
        if arena.insert((node.level, node.index), node.hash).is_some() {
            return Err(malformed(format!(
                "duplicate node at level {} index {}",
                node.level, node.index
            )));
        }
    }

    for level in 0..tree_depth(leaf_count) {
        let width = level_width(leaf_count, level);
        let mut next = BTreeMap::new();
        for (&idx, &hash) in &current {
            let parent = idx / 2;
            if next.contains_key(&parent) {
                continue;
            }
            let sibling = idx ^ 1;
            let sibling_hash = if sibling >= width {
                empty_node()
            } else if let Some(h) = current.get(&sibling) {
                *h
            } else {
                arena
                    .remove(&(level as u32, sibling as u64))
                    .ok_or_else(|| {
                        malformed(format!("missing node at level {level} index {sibling}"))
                    })?
            };
            let combined = if idx % 2 == 0 {
                hash_node(&hash, &sibling_hash)
            } else {
                hash_node(&sibling_hash, &hash)
            };
            next.insert(parent, combined);
        }
        current = next;
    }

    if !arena.is_empty() {
        return Err(malformed(format!("{} unused nodes", arena.len())));
    }
    match current.get(&0) {
        Some(derived) if derived == root => Ok(()),
        _ => Err(malformed("derived root does not match")),
    }
}
