use std::fmt;

use serde::{Deserialize, Serialize};

/// Verifier state per claim. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Accepted,
    Flagged,
    Gated,
}

impl ClaimStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Severity for folding several statuses into one: Gated > Flagged > Accepted.
    pub fn severity(self) -> u8 {
        match self {
            Self::Accepted => 0,
            Self::Flagged => 1,
            Self::Gated => 2,
            Self::Pending => 3,
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Flagged => "flagged",
            Self::Gated => "gated",
        };
        f.write_str(s)
    }
}

/// Why the verifier reached its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Verified,
    CoverageBelowTau,
    EntailmentBelowMinimum,
    Halted,
    VerifierTimeout,
    ScorerFailed,
    /// Every entailment worker was busy and the wait queue was full.
    VerifierSaturated,
}

/// Verifier outcome for one claim. Ephemeral but logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifierDecision {
    pub claim_id: String,
    pub coverage: f64,
    pub entailment: f64,
    pub status: ClaimStatus,
    pub reason: DecisionReason,
}
