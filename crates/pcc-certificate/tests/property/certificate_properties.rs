use chrono::{TimeZone, Utc};
use pcc_certificate::{CertificateAssembler, CertificateContext, CertificateVerifier};
use pcc_commitment::CommitmentBuilder;
use pcc_core::config::CommitmentConfig;
use pcc_core::models::{Document, RetrievedSpan};
use proptest::prelude::*;

fn documents(texts: &[String]) -> Vec<Document> {
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Document::new(format!("doc-{i:03}"), t.clone(), at))
        .collect()
}

fn context() -> CertificateContext {
    CertificateContext {
        tau: 0.8,
        sketch_version: "sketch-v1".into(),
        retriever_version: "pq-m8-v1".into(),
        snapshot_generation: 1,
        degraded: false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn untouched_certificates_verify_and_any_bit_flip_fails(
        texts in prop::collection::vec("[a-z]{3,12}( [a-z]{3,12}){0,6}\\.", 2..12),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..6),
        which in any::<prop::sample::Index>(),
        level in any::<prop::sample::Index>(),
        bit in 0usize..256,
        use_multiproof in any::<bool>(),
    ) {
        let commitment = CommitmentBuilder::new(CommitmentConfig::default())
            .commit(&documents(&texts), 1)
            .unwrap();
        let spans: Vec<RetrievedSpan> = picks
            .iter()
            .map(|p| {
                let r = commitment.record(p.index(commitment.leaf_count())).unwrap();
                RetrievedSpan {
                    doc_id: r.leaf.doc_id.clone(),
                    chunk_id: r.leaf.chunk_id,
                    leaf_index: r.leaf_index,
                    offset_range: r.offset_range,
                    similarity_score: 0.0,
                }
            })
            .collect();
        let cert = CertificateAssembler::new()
            .with_multiproof(use_multiproof)
            .assemble(&commitment, &spans, context())
            .unwrap();
        prop_assert!(CertificateVerifier::verify(&cert, &commitment.root()).is_ok());

        let pos = which.index(cert.spans.len());
        let span = &cert.spans[pos];
        let text = &commitment.record(span.leaf_index).unwrap().text;
        prop_assert!(CertificateVerifier::verify_span_text(&cert, span.leaf_index, text).is_ok());

        // Flip one bit of the span text.
        let mut bytes = text.clone().into_bytes();
        let byte = bit % bytes.len();
        bytes[byte] ^= 1 << (bit % 7);
        let altered = String::from_utf8_lossy(&bytes).into_owned();
        prop_assert!(CertificateVerifier::verify_span_text(&cert, span.leaf_index, &altered).is_err());

        // Flip one bit of a branch hash, or of a multi-proof node.
        if !span.branch.is_empty() {
            let mut tampered = cert.clone();
            let l = level.index(span.branch.len());
            tampered.spans[pos].branch[l] = tampered.spans[pos].branch[l].with_flipped_bit(bit);
            prop_assert!(CertificateVerifier::verify(&tampered, &commitment.root()).is_err());
        }
        if let Some(mp) = cert.multiproof.as_ref().filter(|mp| !mp.nodes.is_empty()) {
            let mut tampered = cert.clone();
            let n = level.index(mp.nodes.len());
            if let Some(m) = tampered.multiproof.as_mut() {
                m.nodes[n].hash = m.nodes[n].hash.with_flipped_bit(bit);
            }
            prop_assert!(CertificateVerifier::verify(&tampered, &commitment.root()).is_err());
        }
    }
}
