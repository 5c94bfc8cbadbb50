//! # pcc-verifier
//!
//! Decides, per claim, whether a draft answer may be released.
//!
//! Coverage is the share of a claim's word tokens that occur in the spans it
//! cites. Entailment comes from a black-box scorer run on a bounded worker pool
//! under a timeout.
//! Anything that cannot be checked in time fails closed to `Gated`.

pub mod coverage;
pub mod engine;
pub mod entailment;
pub mod state;
pub mod tokenizer;

pub use coverage::{token_coverage, CoverageScorer};
pub use engine::ClaimVerifier;
pub use entailment::{EntailmentPool, LexicalEntailment};
pub use state::ClaimLedger;
pub use tokenizer::{tokenize, TokenCache};
