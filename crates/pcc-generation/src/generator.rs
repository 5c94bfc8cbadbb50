//! Generator: decoder output to a cited `Draft`.

use std::sync::Arc;

use pcc_core::errors::{CertificateError, PccError, PccResult};
use pcc_core::models::{
    Citation, Claim, CoverageCertificate, DecodingMode, Draft, EvidenceSpan, OffsetRange, Policy,
    ProposedClaim,
};
use pcc_core::traits::IClaimDecoder;
use pcc_verifier::CoverageScorer;
use tracing::{debug, instrument};

pub struct Generator {
    decoder: Arc<dyn IClaimDecoder>,
    coverage: CoverageScorer,
}

impl Generator {
    pub fn new(decoder: Arc<dyn IClaimDecoder>, token_cache_size: u64) -> Self {
        Self {
            decoder,
            coverage: CoverageScorer::new(token_cache_size),
        }
    }

    pub fn decoder_name(&self) -> &str {
        self.decoder.name()
    }

    /// Produce a draft for `query` from `evidence`.
    ///
    /// Every evidence span must be bound into `certificate`; a claim citing
    /// anything else is rejected.
    #[instrument(skip_all, fields(evidence = evidence.len(), decoder = self.decoder.name()))]
    pub fn generate(
        &self,
        query: &str,
        evidence: &[EvidenceSpan],
        certificate: &CoverageCertificate,
        policy: &Policy,
    ) -> PccResult<Draft> {
        let positions = align(evidence, certificate);
        let proposals = self.decoder.decode(query, evidence)?;

        let mut draft = Draft {
            query: query.to_string(),
            claims: Vec::with_capacity(proposals.len()),
            citations: Vec::new(),
        };
        for (n, proposal) in proposals.iter().enumerate() {
            if proposal.segments.is_empty() {
                continue;
            }
            let claim_id = format!("c{n}");
            let (claim, citations) =
                self.build_claim(claim_id, proposal, evidence, &positions, policy)?;
            draft.claims.push(claim);
            draft.citations.extend(citations);
        }

        debug!(
            claims = draft.claims.len(),
            halted = draft.claims.iter().filter(|c| c.halted).count(),
            "draft generated"
        );
        Ok(draft)
    }

    fn build_claim(
        &self,
        claim_id: String,
        proposal: &ProposedClaim,
        evidence: &[EvidenceSpan],
        positions: &[Option<usize>],
        policy: &Policy,
    ) -> PccResult<(Claim, Vec<Citation>)> {
        let mut text = String::new();
        let mut citations = Vec::new();
        let mut span_indices: Vec<usize> = Vec::new();
        let mut halted = false;

        for segment in &proposal.segments {
            let piece = segment.text.trim();
            if piece.is_empty() {
                continue;
            }
            let span_index = match segment.source {
                Some(e) => Some(certificate_position(e, evidence, positions)?),
                None => None,
            };

            let separator = if text.is_empty() { "" } else { " " };
            let start = text.len() + separator.len();
            let candidate = format!("{text}{separator}{piece}");

            if policy.decoding() == DecodingMode::EarlyStop {
                let mut cited: Vec<usize> = span_indices.clone();
                cited.extend(span_index);
                let texts: Vec<&str> = cited
                    .iter()
                    .filter_map(|&i| {
                        positions
                            .iter()
                            .position(|p| *p == Some(i))
                            .map(|e| evidence[e].text.as_str())
                    })
                    .collect();
                let running = self.coverage.coverage(&candidate, &texts);
                if !policy.coverage_satisfied(running) {
                    debug!(claim_id = %claim_id, running, "claim halted");
                    halted = true;
                    break;
                }
            }

            text = candidate;
            if let Some(i) = span_index {
                span_indices.push(i);
                citations.push(Citation {
                    claim_id: claim_id.clone(),
                    span_index: i,
                    claim_range: OffsetRange::new(start, text.len()),
                });
            }
        }

        span_indices.sort_unstable();
        span_indices.dedup();
        Ok((
            Claim {
                claim_id,
                text,
                span_indices,
                halted,
            },
            citations,
        ))
    }
}

/// Certificate span index for each evidence span, `None` when the span is
/// not bound into the certificate.
fn align(evidence: &[EvidenceSpan], certificate: &CoverageCertificate) -> Vec<Option<usize>> {
    evidence
        .iter()
        .map(|e| {
            certificate.position_of(e.span.leaf_index).filter(|&p| {
                let c = &certificate.spans[p];
                c.doc_id == e.span.doc_id && c.chunk_id == e.span.chunk_id
            })
        })
        .collect()
}

fn certificate_position(
    evidence_index: usize,
    evidence: &[EvidenceSpan],
    positions: &[Option<usize>],
) -> PccResult<usize> {
    let e = evidence.get(evidence_index).ok_or_else(|| PccError::DecoderError {
        reason: format!(
            "segment cites evidence {evidence_index} of {}",
            evidence.len()
        ),
    })?;
    positions
        .get(evidence_index)
        .copied()
        .flatten()
        .ok_or_else(|| {
            CertificateError::SpanNotCertified {
                leaf_index: e.span.leaf_index,
            }
            .into()
        })
}
