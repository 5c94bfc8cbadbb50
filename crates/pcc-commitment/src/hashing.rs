//! Domain-separated leaf and node hashing.

use std::sync::OnceLock;

use pcc_core::constants::{EMPTY_DOMAIN, LEAF_DOMAIN, NODE_DOMAIN};
use pcc_core::Hash32;

/// blake3 of raw span text.
pub fn span_hash(text: &str) -> Hash32 {
    Hash32::digest(text.as_bytes())
}

/// `H(LEAF_DOMAIN ‖ len(doc_id) ‖ doc_id ‖ chunk_id ‖ span_hash)`.
///
/// Integers are little-endian; the length prefix keeps `("ab", 1)` and
/// `("a", ...)` from colliding.
pub fn hash_leaf(doc_id: &str, chunk_id: u32, span_hash: &Hash32) -> Hash32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(LEAF_DOMAIN);
    hasher.update(&(doc_id.len() as u64).to_le_bytes());
    hasher.update(doc_id.as_bytes());
    hasher.update(&chunk_id.to_le_bytes());
    hasher.update(span_hash.as_bytes());
    hasher.finalize().into()
}

/// `H(NODE_DOMAIN ‖ left ‖ right)`.
pub fn hash_node(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(NODE_DOMAIN);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hasher.finalize().into()
}

/// Fixed padding node for odd-width levels.
pub fn empty_node() -> Hash32 {
    static EMPTY: OnceLock<Hash32> = OnceLock::new();
    *EMPTY.get_or_init(|| Hash32::digest(EMPTY_DOMAIN))
}
