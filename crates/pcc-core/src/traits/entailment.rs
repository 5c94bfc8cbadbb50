use crate::errors::PccResult;

/// Black-box entailment model: how strongly do the evidence texts entail the claim?
///
/// Implementations may block (remote inference). The verifier bounds every call
/// with a timeout and treats a timeout as a gate.
pub trait IEntailmentScorer: Send + Sync {
    /// Score in `[0.0, 1.0]`.
    fn score(&self, claim: &str, evidence: &[String]) -> PccResult<f64>;

    fn name(&self) -> &str;
}
