use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pcc_commitment::{CommitmentBuilder, CorpusCommitment};
use pcc_core::config::{CommitmentConfig, RetrievalConfig, SketchConfig, SketchMissMode};
use pcc_core::models::Document;
use pcc_core::traits::IEmbeddingProvider;
use pcc_embeddings::HashingEmbedder;
use pcc_retrieval::{PqIndex, ProductQuantizer, Retriever};
use pcc_sketch::{SketchBucketDirectory, SketchEncoder};

pub const DIMS: usize = 64;

pub struct Fixture {
    pub commitment: CorpusCommitment,
    pub encoder: SketchEncoder,
    pub retriever: Retriever,
    pub embedder: HashingEmbedder,
}

pub fn doc(id: &str, text: &str, day: u32) -> Document {
    Document::new(id, text, Utc.with_ymd_and_hms(2026, 2, day, 0, 0, 0).unwrap())
}

pub fn corpus() -> Vec<Document> {
    vec![
        doc("geo", "Paris is the capital of France. Berlin is the capital of Germany.", 1),
        doc("astro", "The moon orbits the earth. Mars has two moons.", 2),
        doc("chem", "Water boils at one hundred degrees. Salt dissolves in water.", 3),
        doc("music", "The violin has four strings. A piano has many keys.", 4),
    ]
}

pub fn sketch_config(probes: usize) -> SketchConfig {
    SketchConfig {
        num_buckets: 4,
        probes,
        min_affinity: -1.0,
        balance_slack: 1.5,
        assignments_per_chunk: 1,
        kmeans_iterations: 6,
        seed: 5,
    }
}

pub fn retrieval_config(mode: SketchMissMode) -> RetrievalConfig {
    RetrievalConfig {
        pq_subspaces: 4,
        pq_centroids: 64,
        pq_iterations: 4,
        prior_weight: 1.0,
        sketch_miss: mode,
        seed: 9,
    }
}

pub fn build(docs: &[Document], probes: usize, mode: SketchMissMode) -> Fixture {
    let commitment = CommitmentBuilder::new(CommitmentConfig {
        max_chunk_bytes: 40,
        ..Default::default()
    })
    .commit(docs, 1)
    .unwrap();
    let embedder = HashingEmbedder::new(DIMS);
    let texts: Vec<String> = commitment.records().iter().map(|r| r.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).unwrap();

    let rconfig = retrieval_config(mode);
    let pq = ProductQuantizer::train(&rconfig, &embeddings).unwrap();
    let index = PqIndex::build(pq, commitment.records(), &embeddings).unwrap();

    let encoder = SketchEncoder::train(&sketch_config(probes), &embeddings).unwrap();
    let directory = SketchBucketDirectory::build(&encoder, &embeddings, 1, 1.5).unwrap();

    Fixture {
        commitment,
        encoder,
        retriever: Retriever::new(rconfig, Arc::new(index), Arc::new(directory)),
        embedder,
    }
}
