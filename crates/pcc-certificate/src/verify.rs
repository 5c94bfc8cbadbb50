//! Independent certificate verification.
//!
//! Needs only the certificate and the published root. Every failure is a
//! `CertificateError`, which surfaces as `ErrorKind::CertificateMismatch`.

use pcc_commitment::{hash_leaf, span_hash, verify_multiproof, verify_proof};
use pcc_core::constants::{MAX_CERTIFICATE_SPANS, MAX_PROOF_DEPTH};
use pcc_core::errors::{CertificateError, PccResult};
use pcc_core::models::CoverageCertificate;
use pcc_core::Hash32;
use tracing::debug;

use crate::canonical::certificate_digest;

pub struct CertificateVerifier;

impl CertificateVerifier {
    /// Check `cert` against `published_root`: root, canonical span order,
    /// span membership, and the digest.
    ///
    /// Membership comes from the multi-proof when one is present, in which
    /// case spans must carry no branches. Otherwise every span's own branch
    /// is walked.
    pub fn verify(cert: &CoverageCertificate, published_root: &Hash32) -> PccResult<()> {
        if cert.root != *published_root {
            return Err(CertificateError::RootMismatch {
                declared: cert.root.to_hex(),
                published: published_root.to_hex(),
            }
            .into());
        }
        if cert.spans.len() > MAX_CERTIFICATE_SPANS {
            return Err(CertificateError::Malformed {
                reason: format!("{} spans exceeds {MAX_CERTIFICATE_SPANS}", cert.spans.len()),
            }
            .into());
        }
        if cert.spans.windows(2).any(|w| w[0].leaf_index >= w[1].leaf_index) {
            return Err(CertificateError::Malformed {
                reason: "spans not in ascending leaf order".into(),
            }
            .into());
        }

        match &cert.multiproof {
            Some(mp) => {
                if let Some(span) = cert.spans.iter().find(|s| !s.branch.is_empty()) {
                    return Err(CertificateError::Malformed {
                        reason: format!(
                            "leaf {} carries a branch alongside the multi-proof",
                            span.leaf_index
                        ),
                    }
                    .into());
                }
                let leaves: Vec<(usize, Hash32)> = cert
                    .spans
                    .iter()
                    .map(|s| (s.leaf_index, hash_leaf(&s.doc_id, s.chunk_id, &s.span_hash)))
                    .collect();
                verify_multiproof(&cert.root, cert.leaf_count, &leaves, mp).map_err(|e| {
                    CertificateError::MultiProofMismatch {
                        reason: e.to_string(),
                    }
                })?;
            }
            None => {
                for span in &cert.spans {
                    let leaf = hash_leaf(&span.doc_id, span.chunk_id, &span.span_hash);
                    if span.branch.len() > MAX_PROOF_DEPTH
                        || !verify_proof(
                            &cert.root,
                            &leaf,
                            span.leaf_index,
                            cert.leaf_count,
                            &span.branch,
                        )
                    {
                        return Err(CertificateError::BranchMismatch {
                            leaf_index: span.leaf_index,
                        }
                        .into());
                    }
                }
            }
        }

        if certificate_digest(cert) != cert.digest {
            return Err(CertificateError::DigestMismatch.into());
        }

        debug!(
            certificate_id = %cert.certificate_id,
            spans = cert.spans.len(),
            "certificate verified"
        );
        Ok(())
    }

    /// Check that `text` is the exact span committed at `leaf_index`.
    pub fn verify_span_text(cert: &CoverageCertificate, leaf_index: usize, text: &str) -> PccResult<()> {
        let pos = cert
            .position_of(leaf_index)
            .ok_or(CertificateError::SpanNotCertified { leaf_index })?;
        if span_hash(text) != cert.spans[pos].span_hash {
            return Err(CertificateError::SpanHashMismatch { leaf_index }.into());
        }
        Ok(())
    }
}
