/// Sketch and retrieval errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("sketch miss: {buckets} bucket(s) from sketch {sketch_version} selected no candidates")]
    SketchMiss { sketch_version: String, buckets: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index not trained: {component}")]
    NotTrained { component: String },

    #[error("training failed: {reason}")]
    TrainingFailed { reason: String },

    #[error("sketch version {sketch} does not match directory generation {directory}")]
    VersionMismatch { sketch: u64, directory: u64 },

    #[error("unknown bucket {bucket} (sketch has {num_buckets})")]
    UnknownBucket { bucket: u32, num_buckets: usize },
}
