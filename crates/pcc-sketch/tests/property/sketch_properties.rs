use pcc_core::config::SketchConfig;
use pcc_embeddings::l2_normalize;
use pcc_sketch::{SketchBucketDirectory, SketchEncoder};
use proptest::prelude::*;

fn unit_vectors(raw: Vec<Vec<f32>>) -> Vec<Vec<f32>> {
    raw.into_iter()
        .map(|mut v| {
            v[0] += 0.01;
            l2_normalize(&mut v);
            v
        })
        .collect()
}

// ── Balance: no bucket ever exceeds its capacity cap ──────────────────────

proptest! {
    #[test]
    fn directory_never_exceeds_capacity(
        raw in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 8), 4..60),
        buckets in 2usize..8,
        per_chunk in 1usize..3,
    ) {
        let emb = unit_vectors(raw);
        let config = SketchConfig {
            num_buckets: buckets,
            probes: 2,
            min_affinity: 0.0,
            balance_slack: 1.5,
            assignments_per_chunk: per_chunk,
            kmeans_iterations: 4,
            seed: 1,
        };
        let enc = SketchEncoder::train(&config, &emb).unwrap();
        let dir = SketchBucketDirectory::build(&enc, &emb, per_chunk, 1.5).unwrap();
        prop_assert!(dir.occupancy().max <= dir.capacity());
        prop_assert_eq!(dir.generation(), enc.version());
    }

    #[test]
    fn encode_is_deterministic_and_bounded(
        raw in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 8), 8..30),
        query in prop::collection::vec(-1.0f32..1.0, 8),
    ) {
        let emb = unit_vectors(raw);
        let config = SketchConfig {
            num_buckets: 4,
            probes: 3,
            min_affinity: 0.2,
            ..Default::default()
        };
        let enc = SketchEncoder::train(&config, &emb).unwrap();
        let a = enc.encode(&query).unwrap();
        let b = enc.encode(&query).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert!(a.buckets.len() <= 3);
        prop_assert!(a.affinities.iter().all(|&x| x >= 0.2));
        prop_assert_eq!(a.version, 1);
    }
}
