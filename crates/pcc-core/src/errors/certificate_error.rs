/// Coverage certificate errors. Every variant means the certificate does not
/// resolve to the root it was checked against.
#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    #[error("root mismatch: certificate declares {declared}, published root is {published}")]
    RootMismatch { declared: String, published: String },

    #[error("branch for leaf {leaf_index} does not resolve to the declared root")]
    BranchMismatch { leaf_index: usize },

    #[error("multiproof does not resolve to the declared root: {reason}")]
    MultiProofMismatch { reason: String },

    #[error("span hash mismatch for leaf {leaf_index}")]
    SpanHashMismatch { leaf_index: usize },

    #[error("certificate digest mismatch")]
    DigestMismatch,

    #[error("span at leaf {leaf_index} is not covered by the certificate")]
    SpanNotCertified { leaf_index: usize },

    #[error("malformed certificate: {reason}")]
    Malformed { reason: String },
}
