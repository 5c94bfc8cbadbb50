//! ClaimVerifier: coverage, bounded entailment, and the per-claim decision.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pcc_core::config::VerifierConfig;
use pcc_core::errors::{CertificateError, PccError, PccResult, VerifierError};
use pcc_core::models::{
    Claim, ClaimStatus, DecisionReason, Draft, FailureAction, Policy, VerifierDecision,
};
use pcc_core::traits::IEntailmentScorer;
use pcc_core::ErrorKind;
use tracing::{debug, info, instrument};

use crate::coverage::CoverageScorer;
use crate::entailment::EntailmentPool;
use crate::state::ClaimLedger;

pub struct ClaimVerifier {
    timeout: Duration,
    coverage: CoverageScorer,
    pool: EntailmentPool,
}

impl ClaimVerifier {
    pub fn new(config: &VerifierConfig, scorer: Arc<dyn IEntailmentScorer>) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            coverage: CoverageScorer::new(config.token_cache_size),
            pool: EntailmentPool::new(scorer, config.scorer_threads),
        }
    }

    pub fn scorer_name(&self) -> &str {
        self.pool.scorer_name()
    }

    pub fn coverage_scorer(&self) -> &CoverageScorer {
        &self.coverage
    }

    /// Decide every claim in `draft`.
    ///
    /// `span_texts[i]` is the text of certificate span `i`. Entailment calls
    /// never run past `deadline`.
    #[instrument(skip_all, fields(claims = draft.claims.len()))]
    pub fn verify_draft(
        &self,
        draft: &Draft,
        span_texts: &[String],
        policy: &Policy,
        deadline: Option<Instant>,
    ) -> PccResult<Vec<VerifierDecision>> {
        let mut ledger = ClaimLedger::new();
        let mut decisions = Vec::with_capacity(draft.claims.len());

        for claim in &draft.claims {
            ledger.open(&claim.claim_id);
            let mut cited = Vec::with_capacity(claim.span_indices.len());
            for &i in &claim.span_indices {
                let text = span_texts.get(i).ok_or_else(|| CertificateError::Malformed {
                    reason: format!(
                        "claim {} cites span {i} of {}",
                        claim.claim_id,
                        span_texts.len()
                    ),
                })?;
                cited.push(text.clone());
            }

            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            let mut decision = self.verify_claim(claim, cited, policy, remaining);
            decision.status = ledger.settle(&claim.claim_id, decision.status);
            decisions.push(decision);
        }

        let accepted = decisions
            .iter()
            .filter(|d| d.status == ClaimStatus::Accepted)
            .count();
        info!(
            claims = decisions.len(),
            accepted,
            scorer = self.pool.scorer_name(),
            "draft verified"
        );
        Ok(decisions)
    }

    /// Decide one claim given the texts of the spans it cites.
    ///
    /// Accepted only when the claim ran to completion, coverage reaches tau,
    /// and entailment reaches the policy minimum. A scorer that times out
    /// or cannot take the call always gates, whatever `on_failure` says.
    pub fn verify_claim(
        &self,
        claim: &Claim,
        cited: Vec<String>,
        policy: &Policy,
        remaining: Option<Duration>,
    ) -> VerifierDecision {
        let _span = pcc_core::verify_span!(claim.claim_id).entered();
        let coverage = self.coverage.coverage(&claim.text, &cited);
        let failed = match policy.on_failure() {
            FailureAction::Gate => ClaimStatus::Gated,
            FailureAction::Flag => ClaimStatus::Flagged,
        };
        let decision = |entailment: f64, status: ClaimStatus, reason: DecisionReason| {
            VerifierDecision {
                claim_id: claim.claim_id.clone(),
                coverage,
                entailment,
                status,
                reason,
            }
        };

        if claim.halted {
            return decision(0.0, failed, DecisionReason::Halted);
        }
        if !policy.coverage_satisfied(coverage) {
            debug!(coverage, tau = policy.tau(), "coverage below tau");
            return decision(0.0, failed, DecisionReason::CoverageBelowTau);
        }

        let timeout = remaining.map_or(self.timeout, |r| r.min(self.timeout));
        if timeout.is_zero() {
            return decision(0.0, ClaimStatus::Gated, DecisionReason::VerifierTimeout);
        }
        match self.pool.score(&claim.claim_id, &claim.text, cited, timeout) {
            Ok(e) if e >= policy.min_entailment() => {
                decision(e, ClaimStatus::Accepted, DecisionReason::Verified)
            }
            Ok(e) => decision(e, failed, DecisionReason::EntailmentBelowMinimum),
            Err(err) if err.kind() == ErrorKind::VerifierTimeout => {
                decision(0.0, ClaimStatus::Gated, DecisionReason::VerifierTimeout)
            }
            Err(PccError::VerifierError(VerifierError::Saturated { .. })) => {
                decision(0.0, ClaimStatus::Gated, DecisionReason::VerifierSaturated)
            }
            Err(err) => {
                debug!(error = %err, "entailment scorer failed");
                decision(0.0, ClaimStatus::Gated, DecisionReason::ScorerFailed)
            }
        }
    }
}
