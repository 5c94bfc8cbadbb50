// Single source of truth for all default values.

// --- Commitment ---
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 512;
pub const DEFAULT_PARALLEL_HASH_THRESHOLD: usize = 1_024;

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 128;
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;

// --- Sketch ---
pub const DEFAULT_NUM_BUCKETS: usize = 16;
pub const DEFAULT_SKETCH_PROBES: usize = 3;
pub const DEFAULT_MIN_AFFINITY: f32 = 0.05;
pub const DEFAULT_BALANCE_SLACK: f64 = 1.5;
pub const DEFAULT_ASSIGNMENTS_PER_CHUNK: usize = 2;
pub const DEFAULT_SKETCH_KMEANS_ITERATIONS: usize = 12;
pub const DEFAULT_SKETCH_SEED: u64 = 7;

// --- Retrieval ---
pub const DEFAULT_PQ_SUBSPACES: usize = 8;
pub const DEFAULT_PQ_CENTROIDS: usize = 64;
pub const DEFAULT_PQ_ITERATIONS: usize = 10;
pub const DEFAULT_PRIOR_WEIGHT: f32 = 0.1;
pub const DEFAULT_PQ_SEED: u64 = 42;

// --- Verifier ---
pub const DEFAULT_VERIFIER_TIMEOUT_MS: u64 = 250;
pub const DEFAULT_TOKEN_CACHE_SIZE: u64 = 10_000;
pub const DEFAULT_SCORER_THREADS: usize = 4;

// --- Learner ---
pub const DEFAULT_LEARNER_ENABLED: bool = true;
pub const DEFAULT_LEARNER_QUEUE_CAPACITY: usize = 1_024;
pub const DEFAULT_LEARNER_WORKERS: usize = 2;
pub const DEFAULT_LEARNER_BATCH_SIZE: usize = 16;
pub const DEFAULT_LEARNING_RATE: f64 = 0.05;
pub const DEFAULT_CLIP_NORM: f64 = 1.0;
pub const DEFAULT_NOISE_MULTIPLIER: f64 = 1.1;
pub const DEFAULT_PRIOR_STEP: f64 = 0.05;
pub const DEFAULT_PRIOR_CLAMP: f32 = 0.5;

// --- Policy ---
pub const DEFAULT_TAU: f64 = 0.8;
pub const DEFAULT_MIN_ENTAILMENT: f64 = 0.7;
pub const DEFAULT_MAX_SPANS: usize = 8;
pub const DEFAULT_LATENCY_BUDGET_MS: u64 = 2_000;
pub const DEFAULT_MEMORY_BUDGET_MB: u64 = 64;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
