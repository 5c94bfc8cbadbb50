use chrono::{TimeZone, Utc};
use pcc_commitment::{hash_leaf, verify_proof, CommitmentBuilder, MerkleTree};
use pcc_core::config::CommitmentConfig;
use pcc_core::models::Document;
use pcc_core::Hash32;
use proptest::prelude::*;

fn docs_from(texts: &[String]) -> Vec<Document> {
    let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Document::new(format!("doc-{i:04}"), t.clone(), ts))
        .collect()
}

fn builder() -> CommitmentBuilder {
    CommitmentBuilder::new(CommitmentConfig {
        max_chunk_bytes: 24,
        ..Default::default()
    })
}

// ── Inclusion: every committed leaf proves against the root ───────────────

proptest! {
    #[test]
    fn every_leaf_has_a_valid_inclusion_proof(
        texts in prop::collection::vec("[a-z]{1,8}( [a-z]{1,8}){0,12}\\.?", 1..12)
    ) {
        let c = builder().commit(&docs_from(&texts), 1).unwrap();
        for r in c.records() {
            let leaf = hash_leaf(&r.leaf.doc_id, r.leaf.chunk_id, &r.leaf.span_hash);
            let branch = c.get_proof(r.leaf_index).unwrap();
            prop_assert!(verify_proof(&c.root(), &leaf, r.leaf_index, c.leaf_count(), &branch));
        }
    }

    #[test]
    fn flipped_branch_bit_never_verifies(
        n in 2usize..64,
        pick in any::<prop::sample::Index>(),
        bit in 0usize..256,
    ) {
        let leaves: Vec<Hash32> = (0..n).map(|i| Hash32::digest(&(i as u64).to_le_bytes())).collect();
        let tree = MerkleTree::from_leaves(leaves.clone()).unwrap();
        let i = pick.index(n);
        let mut branch = tree.get_proof(i).unwrap();
        let level = bit % branch.len();
        branch[level] = branch[level].with_flipped_bit(bit);
        prop_assert!(!verify_proof(&tree.root(), &leaves[i], i, n, &branch));
    }
}

// ── Determinism: recommit is idempotent and order independent ─────────────

proptest! {
    #[test]
    fn recommit_is_deterministic_under_shuffle(
        texts in prop::collection::vec("[a-z ]{1,60}", 1..10),
        seed in any::<u64>(),
    ) {
        prop_assume!(texts.iter().any(|t| !t.trim().is_empty()));
        let docs = docs_from(&texts);
        let first = builder().commit(&docs, 1).unwrap();

        let mut shuffled = docs.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();
        let second = builder().commit(&shuffled, 2).unwrap();

        prop_assert_eq!(first.root(), second.root());
        prop_assert_eq!(first.leaf_count(), second.leaf_count());
    }
}
