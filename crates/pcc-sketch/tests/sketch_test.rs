use pcc_core::config::SketchConfig;
use pcc_core::traits::IEmbeddingProvider;
use pcc_embeddings::HashingEmbedder;
use pcc_sketch::{SketchBucketDirectory, SketchEncoder};

const TOPICS: &[&str] = &[
    "paris is the capital of france",
    "berlin is the capital of germany",
    "madrid is the capital of spain",
    "the moon orbits the earth every month",
    "mars has two small moons",
    "jupiter is the largest planet",
    "water boils at one hundred degrees",
    "salt dissolves in warm water",
    "iron rusts when exposed to oxygen",
    "the violin has four strings",
    "a piano has eighty eight keys",
    "drums keep the rhythm in a band",
];

fn embeddings() -> Vec<Vec<f32>> {
    let p = HashingEmbedder::new(64);
    TOPICS.iter().map(|t| p.embed(t).unwrap()).collect()
}

fn config() -> SketchConfig {
    SketchConfig {
        num_buckets: 4,
        probes: 2,
        min_affinity: 0.0,
        balance_slack: 1.25,
        assignments_per_chunk: 1,
        kmeans_iterations: 8,
        seed: 11,
    }
}

#[test]
fn training_is_deterministic_for_a_seed() {
    let a = SketchEncoder::train(&config(), &embeddings()).unwrap();
    let b = SketchEncoder::train(&config(), &embeddings()).unwrap();
    assert_eq!(a.centroids(), b.centroids());
    assert_eq!(a.version(), 1);

    let q = HashingEmbedder::new(64).embed("capital of france").unwrap();
    assert_eq!(a.encode(&q).unwrap(), b.encode(&q).unwrap());
}

#[test]
fn occupancy_stays_under_capacity() {
    let emb = embeddings();
    let enc = SketchEncoder::train(&config(), &emb).unwrap();
    let dir = SketchBucketDirectory::build(&enc, &emb, 1, 1.25).unwrap();
    let stats = dir.occupancy();
    assert!(stats.max <= dir.capacity());
    assert_eq!(dir.capacity(), 4); // ceil(12 / 4 * 1.25)
    let listed: usize = (0..dir.num_buckets() as u32)
        .map(|b| dir.bucket(b).unwrap().len())
        .sum();
    assert_eq!(listed, emb.len());
}

#[test]
fn fewer_chunks_than_buckets_shrinks_bucket_count() {
    let emb = embeddings();
    let enc = SketchEncoder::train(&config(), &emb[..3]).unwrap();
    assert_eq!(enc.num_buckets(), 3);
}

#[test]
fn empty_training_set_fails() {
    assert!(SketchEncoder::train(&config(), &[]).is_err());
}

#[test]
fn full_assignment_reaches_every_chunk() {
    let emb = embeddings();
    let config = SketchConfig {
        min_affinity: -1.0,
        ..config()
    };
    let enc = SketchEncoder::train(&config, &emb).unwrap();
    let dir = SketchBucketDirectory::build(&enc, &emb, 4, 1.25).unwrap();
    let out = enc.encode(&emb[4]).unwrap();
    assert_eq!(out.buckets.len(), 2);
    let candidates = dir.candidates(&out.buckets).unwrap();
    assert!(candidates.contains(&4));
}
