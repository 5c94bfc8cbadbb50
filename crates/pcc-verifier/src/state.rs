//! Per-request claim state machine: `Pending -> {Accepted | Flagged | Gated}`.

use std::collections::HashMap;

use pcc_core::models::ClaimStatus;
use tracing::warn;

/// Tracks claim status for one draft. Terminal states never change.
#[derive(Debug, Default)]
pub struct ClaimLedger {
    states: HashMap<String, ClaimStatus>,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a claim as `Pending`. A claim already known keeps its state.
    pub fn open(&mut self, claim_id: &str) -> ClaimStatus {
        *self
            .states
            .entry(claim_id.to_string())
            .or_insert(ClaimStatus::Pending)
    }

    /// Move a pending claim to a terminal state.
    ///
    /// Returns the state the claim ends up in: `to` on success, the existing
    /// terminal state when the claim was already settled.
    pub fn settle(&mut self, claim_id: &str, to: ClaimStatus) -> ClaimStatus {
        let current = self.open(claim_id);
        if current.is_terminal() || !to.is_terminal() {
            if current != to {
                warn!(claim_id, from = %current, to = %to, "ignored claim transition");
            }
            return current;
        }
        self.states.insert(claim_id.to_string(), to);
        to
    }

    pub fn status(&self, claim_id: &str) -> Option<ClaimStatus> {
        self.states.get(claim_id).copied()
    }

    /// True when no claim is still pending.
    pub fn all_settled(&self) -> bool {
        self.states.values().all(|s| s.is_terminal())
    }
}
