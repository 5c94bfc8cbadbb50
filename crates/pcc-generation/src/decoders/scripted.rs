//! Decoder that replays a fixed list of proposed claims.

use pcc_core::errors::PccResult;
use pcc_core::models::{EvidenceSpan, ProposedClaim};
use pcc_core::traits::IClaimDecoder;

/// Returns the same claims for every query. Used for replaying recorded
/// decoder output.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecoder {
    claims: Vec<ProposedClaim>,
}

impl ScriptedDecoder {
    pub fn new(claims: Vec<ProposedClaim>) -> Self {
        Self { claims }
    }
}

impl IClaimDecoder for ScriptedDecoder {
    fn decode(&self, _query: &str, _evidence: &[EvidenceSpan]) -> PccResult<Vec<ProposedClaim>> {
        Ok(self.claims.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
