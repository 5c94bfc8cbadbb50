use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use pcc_core::config::{RetrievalConfig, SketchConfig};
use pcc_core::models::{CorpusLeaf, OffsetRange, SpanRecord};
use pcc_core::Hash32;
use pcc_retrieval::ranking::compare;
use pcc_retrieval::{PqIndex, ProductQuantizer, Retriever};
use pcc_sketch::{SketchBucketDirectory, SketchEncoder};
use proptest::prelude::*;

fn records(n: usize, days: &[i64]) -> Vec<SpanRecord> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| SpanRecord {
            leaf: CorpusLeaf {
                doc_id: format!("doc-{}", i % 5),
                chunk_id: i as u32,
                span_hash: Hash32::digest(&(i as u64).to_le_bytes()),
            },
            leaf_index: i,
            offset_range: OffsetRange::new(0, 1),
            text: String::new(),
            updated_at: base + Duration::days(days[i % days.len()]),
        })
        .collect()
}

fn retriever(embeddings: &[Vec<f32>], recs: &[SpanRecord], probes: usize) -> (SketchEncoder, Retriever) {
    let rconfig = RetrievalConfig {
        pq_subspaces: 2,
        pq_centroids: 8,
        pq_iterations: 3,
        ..Default::default()
    };
    let pq = ProductQuantizer::train(&rconfig, embeddings).unwrap();
    let index = PqIndex::build(pq, recs, embeddings).unwrap();
    let sconfig = SketchConfig {
        num_buckets: 4,
        probes,
        min_affinity: -1.0,
        ..Default::default()
    };
    let encoder = SketchEncoder::train(&sconfig, embeddings).unwrap();
    let directory = SketchBucketDirectory::build(&encoder, embeddings, 1, 1.5).unwrap();
    (encoder, Retriever::new(rconfig, Arc::new(index), Arc::new(directory)))
}

// ── Ranking: results are bounded, pruned, and in canonical order ──────────

proptest! {
    #[test]
    fn results_are_bounded_pruned_and_ordered(
        embeddings in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 8), 4..40),
        days in prop::collection::vec(0i64..3, 1..4),
        query in prop::collection::vec(-1.0f32..1.0, 8),
        probes in 1usize..4,
        k in 1usize..10,
    ) {
        let recs = records(embeddings.len(), &days);
        let (encoder, retriever) = retriever(&embeddings, &recs, probes);
        let sketch = encoder.encode(&query).unwrap();
        let out = retriever.search(&sketch, &query, k).unwrap();

        prop_assert!(out.spans.len() <= k);
        if !out.degraded {
            let listed = retriever.directory().candidates(&sketch.buckets).unwrap();
            prop_assert!(out.spans.iter().all(|s| listed.contains(&s.leaf_index)));
        }
        for w in out.spans.windows(2) {
            let a = retriever.index().meta(w[0].leaf_index).unwrap();
            let b = retriever.index().meta(w[1].leaf_index).unwrap();
            prop_assert_ne!(
                compare((a, w[0].similarity_score), (b, w[1].similarity_score)),
                Ordering::Greater
            );
        }
    }
}
