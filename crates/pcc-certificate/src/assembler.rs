//! Certificate assembly from a commitment and retrieved spans.

use chrono::Utc;
use pcc_commitment::CorpusCommitment;
use pcc_core::constants::MAX_CERTIFICATE_SPANS;
use pcc_core::errors::{CertificateError, CommitmentError, PccResult};
use pcc_core::models::{CertifiedSpan, CoverageCertificate, RetrievedSpan};
use pcc_core::Hash32;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::canonical::certificate_digest;
use crate::verify::CertificateVerifier;

/// Request-level stamps bound into a certificate.
#[derive(Debug, Clone)]
pub struct CertificateContext {
    pub tau: f64,
    pub sketch_version: String,
    pub retriever_version: String,
    pub snapshot_generation: u64,
    pub degraded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CertificateAssembler {
    include_multiproof: bool,
}

impl CertificateAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prove membership with one shared-ancestor multi-proof instead of a
    /// branch per span.
    pub fn with_multiproof(mut self, include: bool) -> Self {
        self.include_multiproof = include;
        self
    }

    /// Bind `spans` to `commitment`'s root.
    ///
    /// Spans are sorted by leaf index and deduplicated. Each must match the
    /// committed `(doc_id, chunk_id)` at its leaf index. The result is
    /// verified before it is returned.
    #[instrument(skip_all, fields(spans = spans.len()))]
    pub fn assemble(
        &self,
        commitment: &CorpusCommitment,
        spans: &[RetrievedSpan],
        context: CertificateContext,
    ) -> PccResult<CoverageCertificate> {
        let mut ordered: Vec<&RetrievedSpan> = spans.iter().collect();
        ordered.sort_by_key(|s| s.leaf_index);
        ordered.dedup_by_key(|s| s.leaf_index);
        if ordered.len() > MAX_CERTIFICATE_SPANS {
            return Err(CertificateError::Malformed {
                reason: format!("{} spans exceeds {MAX_CERTIFICATE_SPANS}", ordered.len()),
            }
            .into());
        }

        let use_multiproof = self.include_multiproof && !ordered.is_empty();
        let mut certified = Vec::with_capacity(ordered.len());
        for span in ordered {
            let record = commitment.record(span.leaf_index).ok_or(
                CommitmentError::LeafOutOfRange {
                    index: span.leaf_index,
                    leaf_count: commitment.leaf_count(),
                },
            )?;
            if record.leaf.doc_id != span.doc_id || record.leaf.chunk_id != span.chunk_id {
                return Err(CertificateError::Malformed {
                    reason: format!(
                        "{} is not the span committed at leaf {}",
                        span.span_ref(),
                        span.leaf_index
                    ),
                }
                .into());
            }
            certified.push(CertifiedSpan {
                doc_id: record.leaf.doc_id.clone(),
                chunk_id: record.leaf.chunk_id,
                offset_range: record.offset_range,
                span_hash: record.leaf.span_hash,
                leaf_index: record.leaf_index,
                branch: if use_multiproof {
                    Vec::new()
                } else {
                    commitment.get_proof(record.leaf_index)?
                },
            });
        }

        let multiproof = if use_multiproof {
            let indices: Vec<usize> = certified.iter().map(|s| s.leaf_index).collect();
            Some(commitment.multiproof(&indices)?)
        } else {
            None
        };

        let mut cert = CoverageCertificate {
            certificate_id: Uuid::new_v4().to_string(),
            root: commitment.root(),
            epoch: commitment.epoch(),
            leaf_count: commitment.leaf_count(),
            spans: certified,
            tau: context.tau,
            sketch_version: context.sketch_version,
            retriever_version: context.retriever_version,
            snapshot_generation: context.snapshot_generation,
            degraded: context.degraded,
            timestamp: Utc::now(),
            multiproof,
            digest: Hash32::ZERO,
        };
        cert.digest = certificate_digest(&cert);

        CertificateVerifier::verify(&cert, &commitment.root())?;
        debug!(
            certificate_id = %cert.certificate_id,
            spans = cert.spans.len(),
            degraded = cert.degraded,
            "certificate assembled"
        );
        Ok(cert)
    }
}
