mod certificate;
mod claim;
mod corpus;
mod decision;
mod degradation_event;
mod hash;
mod learning;
mod policy;
mod retrieved_span;

pub use certificate::{CertifiedSpan, CoverageCertificate, MultiProof, ProofNode};
pub use claim::{Citation, Claim, ClaimSegment, Draft, ProposedClaim};
pub use corpus::{CorpusLeaf, Document, OffsetRange, SpanRecord, SpanRef};
pub use decision::{ClaimStatus, DecisionReason, VerifierDecision};
pub use degradation_event::DegradationEvent;
pub use hash::Hash32;
pub use learning::{CentroidDelta, FeedbackEvent, LearnerUpdate, PriorDelta, SpanCredit};
pub use policy::{DecodingMode, FailureAction, Policy, PolicySpec};
pub use retrieved_span::{EvidenceSpan, RetrievedSpan};
