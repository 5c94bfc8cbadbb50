//! # pcc-retrieval
//!
//! Product-quantized retrieval. Only chunk codes are kept in memory; queries
//! score candidates through per-subspace inner-product lookup tables. Search
//! is restricted to the candidates the sketch directory lists for the query's
//! buckets, with an explicit full-scan fallback when that set is empty.

pub mod engine;
pub mod pq;
pub mod ranking;

pub use engine::{Retriever, SearchOutcome};
pub use pq::{PqIndex, ProductQuantizer, SpanMeta};
