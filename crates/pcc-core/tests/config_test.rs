use pcc_core::config::*;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = PccConfig::from_toml("").unwrap();

    assert_eq!(config.commitment.max_chunk_bytes, 512);
    assert_eq!(config.embedding.dimensions, 128);
    assert_eq!(config.sketch.num_buckets, 16);
    assert_eq!(config.sketch.probes, 3);
    assert_eq!(config.retrieval.pq_subspaces, 8);
    assert_eq!(config.retrieval.sketch_miss, SketchMissMode::FullScan);
    assert_eq!(config.verifier.timeout_ms, 250);
    assert_eq!(config.verifier.scorer_threads, 4);
    assert_eq!(config.learner.overload, OverloadPolicy::DropOldest);
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn partial_toml_overrides_only_named_keys() {
    let config = PccConfig::from_toml(
        r#"
        [retrieval]
        sketch_miss = "fail"

        [learner]
        overload = "reject_new"
        queue_capacity = 8
        "#,
    )
    .unwrap();

    assert_eq!(config.retrieval.sketch_miss, SketchMissMode::Fail);
    assert_eq!(config.retrieval.pq_centroids, 64);
    assert_eq!(config.learner.overload, OverloadPolicy::RejectNew);
    assert_eq!(config.learner.queue_capacity, 8);
    assert_eq!(config.learner.workers, 2);
}

#[test]
fn indivisible_dimensions_rejected() {
    let err = PccConfig::from_toml(
        r#"
        [embedding]
        dimensions = 100

        [retrieval]
        pq_subspaces = 8
        "#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("divisible"));
}

#[test]
fn unknown_enum_value_is_a_config_error() {
    let err = PccConfig::from_toml(
        r#"
        [learner]
        overload = "block"
        "#,
    )
    .unwrap_err();
    assert_eq!(err.kind(), pcc_core::ErrorKind::Config);
}

#[test]
fn chunk_limit_is_named_in_bytes() {
    let config = PccConfig::from_toml(
        r#"
        [commitment]
        max_chunk_bytes = 96
        "#,
    )
    .unwrap();
    assert_eq!(config.commitment.max_chunk_bytes, 96);

    let err = PccConfig::from_toml("[commitment]\nmax_chunk_bytes = 0\n").unwrap_err();
    assert!(err.to_string().contains("max_chunk_bytes"));
}

#[test]
fn zero_scorer_threads_rejected() {
    let err = PccConfig::from_toml("[verifier]\nscorer_threads = 0\n").unwrap_err();
    assert_eq!(err.kind(), pcc_core::ErrorKind::Config);
    assert!(err.to_string().contains("scorer_threads"));
}
