mod common;

use std::sync::Arc;

use common::{build, corpus, doc};
use pcc_core::config::SketchMissMode;
use pcc_core::models::PriorDelta;
use pcc_core::traits::IEmbeddingProvider;
use pcc_core::{ErrorKind, PccError};
use pcc_retrieval::Retriever;
use pcc_sketch::SketchOutput;

fn empty_sketch(version: u64) -> SketchOutput {
    SketchOutput {
        buckets: vec![],
        affinities: vec![],
        version,
    }
}

#[test]
fn best_match_ranks_first_with_full_probing() {
    let f = build(&corpus(), 4, SketchMissMode::FullScan);
    let q = f.embedder.embed("what is the capital of france").unwrap();
    let sketch = f.encoder.encode(&q).unwrap();
    let out = f.retriever.search(&sketch, &q, 3).unwrap();

    assert!(!out.degraded);
    assert_eq!(out.spans.len(), 3);
    assert_eq!(out.spans[0].doc_id, "geo");
    assert_eq!(out.spans[0].chunk_id, 0);
    assert_eq!(out.sketch_version, "sketch-v1");
    for w in out.spans.windows(2) {
        assert!(w[0].similarity_score >= w[1].similarity_score);
    }
}

#[test]
fn single_probe_scans_only_its_bucket() {
    let f = build(&corpus(), 1, SketchMissMode::FullScan);
    let q = f.embedder.embed("mars moons").unwrap();
    let sketch = f.encoder.encode(&q).unwrap();
    assert_eq!(sketch.buckets.len(), 1);

    let listed = f.retriever.directory().candidates(&sketch.buckets).unwrap();
    let out = f.retriever.search(&sketch, &q, 8).unwrap();
    if listed.is_empty() {
        assert!(out.degraded);
    } else {
        assert!(!out.degraded);
        assert_eq!(out.candidates_scanned, listed.len());
        assert!(listed.len() < f.commitment.leaf_count());
        assert!(out.spans.iter().all(|s| listed.contains(&s.leaf_index)));
    }
}

#[test]
fn empty_sketch_falls_back_to_degraded_full_scan() {
    let f = build(&corpus(), 2, SketchMissMode::FullScan);
    let q = f.embedder.embed("violin strings").unwrap();
    let out = f.retriever.search(&empty_sketch(1), &q, 2).unwrap();

    assert!(out.degraded);
    assert_eq!(out.candidates_scanned, f.commitment.leaf_count());
    assert_eq!(out.spans.len(), 2);
    let event = out.degradation.unwrap();
    assert_eq!(event.fallback_used, "full_scan");
}

#[test]
fn empty_sketch_in_fail_mode_is_a_sketch_miss() {
    let f = build(&corpus(), 2, SketchMissMode::Fail);
    let q = f.embedder.embed("violin strings").unwrap();
    let err = f.retriever.search(&empty_sketch(1), &q, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SketchMiss);
    assert!(err.to_string().contains("sketch-v1"));
}

#[test]
fn stale_sketch_version_is_rejected() {
    let f = build(&corpus(), 2, SketchMissMode::FullScan);
    let q = f.embedder.embed("water").unwrap();
    let mut sketch = f.encoder.encode(&q).unwrap();
    sketch.version = 7;
    assert_eq!(
        f.retriever.search(&sketch, &q, 2).unwrap_err().kind(),
        ErrorKind::Index
    );
}

#[test]
fn checkpoint_error_aborts_search() {
    let f = build(&corpus(), 4, SketchMissMode::FullScan);
    let q = f.embedder.embed("water").unwrap();
    let sketch = f.encoder.encode(&q).unwrap();
    let err = f
        .retriever
        .search_with_checkpoint(&sketch, &q, 2, || {
            Err(PccError::DecoderError {
                reason: "stop".into(),
            })
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decoder);
}

#[test]
fn identical_scores_break_ties_by_recency_then_priors_override() {
    let docs = vec![
        doc("a-old", "The same sentence twice.", 1),
        doc("b-new", "The same sentence twice.", 9),
        doc("c", "Something else entirely here.", 5),
    ];
    let f = build(&docs, 4, SketchMissMode::FullScan);
    let q = f.embedder.embed("the same sentence twice").unwrap();
    let out = f.retriever.search(&empty_sketch(1), &q, 2).unwrap();
    assert_eq!(out.spans[0].doc_id, "b-new");
    assert_eq!(out.spans[1].doc_id, "a-old");

    let boosted = f.retriever.index().with_prior_deltas(&[PriorDelta {
        leaf_index: 0,
        delta: 0.3,
    }]);
    assert_eq!(boosted.version(), 2);
    assert_eq!(boosted.prior(0), 0.3);
    let retriever = Retriever::new(
        common::retrieval_config(SketchMissMode::FullScan),
        Arc::new(boosted),
        Arc::new(f.retriever.directory().clone()),
    );
    let out = retriever.search(&empty_sketch(1), &q, 2).unwrap();
    assert_eq!(out.spans[0].doc_id, "a-old");
    assert!(out.retriever_version.ends_with("-v2"));
}

#[test]
fn priors_are_clamped() {
    let f = build(&corpus(), 2, SketchMissMode::FullScan);
    let boosted = f.retriever.index().with_prior_deltas(&[
        PriorDelta {
            leaf_index: 1,
            delta: 10.0,
        },
        PriorDelta {
            leaf_index: 999,
            delta: 1.0,
        },
    ]);
    assert_eq!(boosted.prior(1), 0.5);
}
