//! # pcc-embeddings
//!
//! Text to vector mapping for queries and committed spans.
//! A deterministic feature-hashing provider is always available; callers may
//! put a model-backed provider in front of it. Results are cached by content hash.

pub mod cache;
pub mod degradation;
pub mod engine;
pub mod providers;

pub use engine::EmbeddingEngine;
pub use providers::HashingEmbedder;

/// Cosine similarity of two equal-length vectors. Zero vectors score 0.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

/// Normalize in place to unit L2 length. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
