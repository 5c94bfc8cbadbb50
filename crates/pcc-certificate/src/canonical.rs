//! Canonical certificate encoding.
//!
//! Every field except `digest` is fed to blake3 in declaration order.
//! Strings and sequences are length-prefixed, integers are little-endian,
//! `tau` is its IEEE-754 bit pattern, and the timestamp is seconds plus
//! nanoseconds. JSON formatting never influences the digest.

use pcc_core::constants::CERTIFICATE_DOMAIN;
use pcc_core::models::{CoverageCertificate, MultiProof};
use pcc_core::Hash32;

struct Encoder(blake3::Hasher);

impl Encoder {
    fn u8(&mut self, v: u8) {
        self.0.update(&[v]);
    }

    fn u32(&mut self, v: u32) {
        self.0.update(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.0.update(&v.to_le_bytes());
    }

    fn i64(&mut self, v: i64) {
        self.0.update(&v.to_le_bytes());
    }

    fn count(&mut self, n: usize) {
        self.u64(n as u64);
    }

    fn str(&mut self, s: &str) {
        self.count(s.len());
        self.0.update(s.as_bytes());
    }

    fn hash(&mut self, h: &Hash32) {
        self.0.update(h.as_bytes());
    }

    fn multiproof(&mut self, mp: Option<&MultiProof>) {
        let Some(mp) = mp else {
            self.u8(0);
            return;
        };
        self.u8(1);
        self.count(mp.leaf_indices.len());
        for &i in &mp.leaf_indices {
            self.count(i);
        }
        self.count(mp.nodes.len());
        for n in &mp.nodes {
            self.u32(n.level);
            self.u64(n.index);
            self.hash(&n.hash);
        }
    }
}

/// blake3 digest of the canonical encoding of `cert` (its `digest` field excluded).
pub fn certificate_digest(cert: &CoverageCertificate) -> Hash32 {
    let mut e = Encoder(blake3::Hasher::new());
    e.0.update(CERTIFICATE_DOMAIN);
    e.str(&cert.certificate_id);
    e.hash(&cert.root);
    e.u64(cert.epoch);
    e.count(cert.leaf_count);

    e.count(cert.spans.len());
    for s in &cert.spans {
        e.str(&s.doc_id);
        e.u32(s.chunk_id);
        e.count(s.offset_range.start);
        e.count(s.offset_range.end);
        e.hash(&s.span_hash);
        e.count(s.leaf_index);
        e.count(s.branch.len());
        for h in &s.branch {
            e.hash(h);
        }
    }

    e.u64(cert.tau.to_bits());
    e.str(&cert.sketch_version);
    e.str(&cert.retriever_version);
    e.u64(cert.snapshot_generation);
    e.u8(cert.degraded as u8);
    e.i64(cert.timestamp.timestamp());
    e.u32(cert.timestamp.timestamp_subsec_nanos());
    e.multiproof(cert.multiproof.as_ref());

    e.0.finalize().into()
}
