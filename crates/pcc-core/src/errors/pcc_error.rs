use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CertificateError, CommitmentError, LearnerError, RetrievalError, VerifierError};

/// Which budget a request ran out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetResource {
    Latency,
    Memory,
}

impl fmt::Display for BudgetResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latency => write!(f, "latency"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Machine-readable error kind carried by every failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyCorpus,
    SketchMiss,
    VerifierTimeout,
    CertificateMismatch,
    BudgetExceeded,
    InvalidPolicy,
    Config,
    Embedding,
    Decoder,
    Entailment,
    LearnerOverloaded,
    Index,
    Serialization,
}

/// Top-level error type for the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PccError {
    #[error("commitment error: {0}")]
    CommitmentError(#[from] CommitmentError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("certificate error: {0}")]
    CertificateError(#[from] CertificateError),

    #[error("verifier error: {0}")]
    VerifierError(#[from] VerifierError),

    #[error("learner error: {0}")]
    LearnerError(#[from] LearnerError),

    #[error("{resource} budget exceeded during {stage}: used {used}, limit {limit}")]
    BudgetExceeded {
        resource: BudgetResource,
        stage: String,
        used: u64,
        limit: u64,
    },

    #[error("invalid policy: {reason}")]
    InvalidPolicy { reason: String },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("embedding error: {reason}")]
    EmbeddingError { reason: String },

    #[error("decoder error: {reason}")]
    DecoderError { reason: String },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl PccError {
    /// The machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CommitmentError(CommitmentError::EmptyCorpus) => ErrorKind::EmptyCorpus,
            Self::CommitmentError(_) => ErrorKind::Index,
            Self::RetrievalError(RetrievalError::SketchMiss { .. }) => ErrorKind::SketchMiss,
            Self::RetrievalError(_) => ErrorKind::Index,
            Self::CertificateError(_) => ErrorKind::CertificateMismatch,
            Self::VerifierError(VerifierError::Timeout { .. }) => ErrorKind::VerifierTimeout,
            Self::VerifierError(_) => ErrorKind::Entailment,
            Self::LearnerError(_) => ErrorKind::LearnerOverloaded,
            Self::BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
            Self::InvalidPolicy { .. } => ErrorKind::InvalidPolicy,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::EmbeddingError { .. } => ErrorKind::Embedding,
            Self::DecoderError { .. } => ErrorKind::Decoder,
            Self::SerializationError(_) => ErrorKind::Serialization,
        }
    }

    /// Whether the failure means "an answer may exist but cannot be verified"
    /// rather than "no answer could be produced".
    pub fn is_unverifiable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CertificateMismatch | ErrorKind::VerifierTimeout | ErrorKind::Entailment
        )
    }
}
