use chrono::{TimeZone, Utc};
use pcc_core::models::*;

#[test]
fn hash_hex_round_trip() {
    let h = Hash32::digest(b"span text");
    let parsed = Hash32::from_hex(&h.to_hex()).unwrap();
    assert_eq!(h, parsed);
    assert_eq!(h.to_hex().len(), 64);
}

#[test]
fn hash_serializes_as_hex_string() {
    let h = Hash32::digest(b"x");
    let json = serde_json::to_string(&h).unwrap();
    assert_eq!(json, format!("\"{}\"", h.to_hex()));
}

#[test]
fn flipped_bit_changes_hash() {
    let h = Hash32::digest(b"x");
    for bit in [0, 7, 8, 255] {
        assert_ne!(h, h.with_flipped_bit(bit));
        assert_eq!(h, h.with_flipped_bit(bit).with_flipped_bit(bit));
    }
}

#[test]
fn span_ref_orders_lexically() {
    let mut refs = vec![
        SpanRef::new("b", 0),
        SpanRef::new("a", 2),
        SpanRef::new("a", 1),
    ];
    refs.sort();
    assert_eq!(refs[0], SpanRef::new("a", 1));
    assert_eq!(refs[2], SpanRef::new("b", 0));
    assert_eq!(refs[1].to_string(), "a#2");
}

#[test]
fn certificate_position_lookup_uses_leaf_index() {
    let span = |leaf_index| CertifiedSpan {
        doc_id: "d".into(),
        chunk_id: leaf_index as u32,
        offset_range: OffsetRange::new(0, 1),
        span_hash: Hash32::ZERO,
        leaf_index,
        branch: vec![],
    };
    let cert = CoverageCertificate {
        certificate_id: "c".into(),
        root: Hash32::ZERO,
        epoch: 1,
        leaf_count: 8,
        spans: vec![span(1), span(4), span(6)],
        tau: 0.9,
        sketch_version: "sketch-v1".into(),
        retriever_version: "pq-v1".into(),
        snapshot_generation: 1,
        degraded: false,
        timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        multiproof: None,
        digest: Hash32::ZERO,
    };
    assert_eq!(cert.position_of(4), Some(1));
    assert_eq!(cert.position_of(5), None);

    let json = cert.to_json().unwrap();
    assert!(!json.contains("multiproof"));
    assert_eq!(CoverageCertificate::from_json(&json).unwrap(), cert);
}

#[test]
fn claim_status_terminality() {
    assert!(!ClaimStatus::Pending.is_terminal());
    assert!(ClaimStatus::Gated.is_terminal());
    assert!(ClaimStatus::Gated.severity() > ClaimStatus::Flagged.severity());
    assert!(ClaimStatus::Flagged.severity() > ClaimStatus::Accepted.severity());
}
