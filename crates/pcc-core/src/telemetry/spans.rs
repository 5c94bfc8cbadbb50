//! Span definitions per stage: commit, sketch, retrieve, certify, generate, verify, learn.

/// Create a commitment span.
#[macro_export]
macro_rules! commit_span {
    ($documents:expr) => {
        tracing::info_span!("pcc.commit", documents = $documents)
    };
}

/// Create a sketch span.
#[macro_export]
macro_rules! sketch_span {
    ($version:expr) => {
        tracing::debug_span!("pcc.sketch", version = %$version)
    };
}

/// Create a retrieval span.
#[macro_export]
macro_rules! retrieval_span {
    ($buckets:expr, $k:expr) => {
        tracing::info_span!("pcc.retrieve", buckets = $buckets, k = $k)
    };
}

/// Create a certificate assembly span.
#[macro_export]
macro_rules! certify_span {
    ($spans:expr) => {
        tracing::debug_span!("pcc.certify", spans = $spans)
    };
}

/// Create a generation span.
#[macro_export]
macro_rules! generate_span {
    ($decoder:expr) => {
        tracing::debug_span!("pcc.generate", decoder = %$decoder)
    };
}

/// Create a verification span.
#[macro_export]
macro_rules! verify_span {
    ($claim_id:expr) => {
        tracing::debug_span!("pcc.verify", claim_id = %$claim_id)
    };
}

/// Create a learning span.
#[macro_export]
macro_rules! learn_span {
    ($batch_size:expr) => {
        tracing::info_span!("pcc.learn", batch_size = $batch_size)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const COMMIT: &str = "pcc.commit";
    pub const SKETCH: &str = "pcc.sketch";
    pub const RETRIEVE: &str = "pcc.retrieve";
    pub const CERTIFY: &str = "pcc.certify";
    pub const GENERATE: &str = "pcc.generate";
    pub const VERIFY: &str = "pcc.verify";
    pub const LEARN: &str = "pcc.learn";
}
