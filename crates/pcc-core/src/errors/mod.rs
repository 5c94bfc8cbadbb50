mod certificate_error;
mod commitment_error;
mod learner_error;
mod pcc_error;
mod retrieval_error;
mod verifier_error;

pub use certificate_error::CertificateError;
pub use commitment_error::CommitmentError;
pub use learner_error::LearnerError;
pub use pcc_error::{BudgetResource, ErrorKind, PccError};
pub use retrieval_error::RetrievalError;
pub use verifier_error::VerifierError;

/// Convenience alias used throughout the workspace.
pub type PccResult<T> = Result<T, PccError>;
