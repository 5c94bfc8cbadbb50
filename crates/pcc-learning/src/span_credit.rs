//! Span credit: which spans an answer's feedback rewards.

use std::collections::BTreeSet;

use chrono::Utc;
use pcc_core::models::{
    ClaimStatus, CoverageCertificate, Draft, FeedbackEvent, SpanCredit, VerifierDecision,
};

/// Reward per credited span.
pub const CREDIT_REWARD: f64 = 1.0;

/// Build feedback for one answered request.
///
/// Only spans cited by an `Accepted` claim are credited, and nothing is
/// credited when any claim was `Flagged`. Returns `None` when there is
/// nothing to learn from.
pub fn credit_spans(
    certificate: &CoverageCertificate,
    draft: &Draft,
    decisions: &[VerifierDecision],
    query_embedding: &[f32],
    sketch_version: u64,
    buckets: &[u32],
    num_buckets: u32,
) -> Option<FeedbackEvent> {
    if decisions.iter().any(|d| d.status == ClaimStatus::Flagged) {
        return None;
    }

    let mut positions = BTreeSet::new();
    for claim in &draft.claims {
        let accepted = decisions
            .iter()
            .any(|d| d.claim_id == claim.claim_id && d.status == ClaimStatus::Accepted);
        if accepted {
            positions.extend(claim.span_indices.iter().copied());
        }
    }

    let credited: Vec<SpanCredit> = positions
        .into_iter()
        .filter_map(|p| certificate.spans.get(p))
        .map(|s| SpanCredit {
            span: s.span_ref(),
            leaf_index: s.leaf_index,
            reward: CREDIT_REWARD,
        })
        .collect();
    if credited.is_empty() {
        return None;
    }

    Some(FeedbackEvent {
        query_embedding: query_embedding.to_vec(),
        epoch: certificate.epoch,
        sketch_version,
        buckets: buckets.to_vec(),
        num_buckets,
        leaf_count: certificate.leaf_count,
        credited,
        timestamp: Utc::now(),
    })
}
