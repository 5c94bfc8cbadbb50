/// Claim verifier errors. Every variant fails closed to `Gated`.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    #[error("verifier timeout on claim {claim_id}: budget {budget_ms}ms")]
    Timeout { claim_id: String, budget_ms: u64 },

    #[error("entailment scorer {scorer} failed: {reason}")]
    ScorerFailed { scorer: String, reason: String },

    #[error("entailment scorer {scorer} saturated: {capacity} calls already pending")]
    Saturated { scorer: String, capacity: usize },
}
