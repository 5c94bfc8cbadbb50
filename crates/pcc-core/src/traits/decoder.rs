use crate::errors::PccResult;
use crate::models::{EvidenceSpan, ProposedClaim};

/// Black-box text generator producing claims as attributed segments.
pub trait IClaimDecoder: Send + Sync {
    fn decode(&self, query: &str, evidence: &[EvidenceSpan]) -> PccResult<Vec<ProposedClaim>>;

    fn name(&self) -> &str;
}
