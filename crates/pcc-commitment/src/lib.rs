//! # pcc-commitment
//!
//! Offline corpus commitment. Documents are chunked into spans, each span
//! becomes a domain-separated leaf, and the leaves are folded into a binary
//! blake3 Merkle tree whose root identifies the corpus epoch.
//!
//! Inclusion proofs are ordered sibling lists (leaf to root); multi-proofs
//! share ancestors across several leaves.

pub mod chunker;
pub mod engine;
pub mod hashing;
pub mod multiproof;
pub mod tree;

pub use engine::{CommitmentBuilder, CorpusCommitment};
pub use hashing::{empty_node, hash_leaf, hash_node, span_hash};
pub use multiproof::{build_multiproof, verify_multiproof};
pub use tree::{tree_depth, verify_proof, MerkleTree};
