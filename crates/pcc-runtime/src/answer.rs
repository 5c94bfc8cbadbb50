//! Response type for one answered request.

use pcc_core::models::{Claim, ClaimStatus, CoverageCertificate, Draft, VerifierDecision};
use serde::{Deserialize, Serialize};

/// What the caller can do with an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// At least one claim was accepted.
    Verified,
    /// Claims were produced but none could be verified.
    Unverifiable,
    /// No claim was produced.
    NoAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub draft: Draft,
    pub certificate: CoverageCertificate,
    pub decisions: Vec<VerifierDecision>,
    /// Most severe claim status; `Gated` when there are no claims.
    pub status: ClaimStatus,
    pub elapsed_ms: u64,
}

impl Answer {
    pub(crate) fn fold_status(decisions: &[VerifierDecision]) -> ClaimStatus {
        decisions
            .iter()
            .map(|d| d.status)
            .max_by_key(|s| s.severity())
            .unwrap_or(ClaimStatus::Gated)
    }

    pub fn disposition(&self) -> Disposition {
        if self
            .decisions
            .iter()
            .any(|d| d.status == ClaimStatus::Accepted)
        {
            Disposition::Verified
        } else if self.draft.claims.is_empty() {
            Disposition::NoAnswer
        } else {
            Disposition::Unverifiable
        }
    }

    /// Claims that may be shown: accepted ones and flagged ones.
    pub fn released_claims(&self) -> impl Iterator<Item = &Claim> {
        self.draft.claims.iter().filter(move |c| {
            self.decisions.iter().any(|d| {
                d.claim_id == c.claim_id
                    && matches!(d.status, ClaimStatus::Accepted | ClaimStatus::Flagged)
            })
        })
    }

    /// Lowest per-claim coverage, 0 when there are no claims.
    pub fn coverage(&self) -> f64 {
        self.decisions
            .iter()
            .map(|d| d.coverage)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    pub fn degraded(&self) -> bool {
        self.certificate.degraded
    }
}
