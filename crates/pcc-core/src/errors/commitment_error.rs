/// Corpus commitment errors.
#[derive(Debug, thiserror::Error)]
pub enum CommitmentError {
    #[error("commit attempted on an empty corpus")]
    EmptyCorpus,

    #[error("duplicate document id {doc_id}")]
    DuplicateDocument { doc_id: String },

    #[error("leaf index {index} out of range for {leaf_count} leaves")]
    LeafOutOfRange { index: usize, leaf_count: usize },

    #[error("malformed proof: {reason}")]
    MalformedProof { reason: String },
}
