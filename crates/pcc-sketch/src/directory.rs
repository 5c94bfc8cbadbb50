//! Bucket directory: bucket id to candidate leaf indices.

use serde::Serialize;
use tracing::{debug, warn};

use pcc_core::errors::{PccResult, RetrievalError};
use pcc_embeddings::cosine;

use crate::encoder::SketchEncoder;
use crate::training::bucket_capacity;

/// Occupancy summary across buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// `max / mean`; 1.0 is perfectly balanced.
    pub balance_ratio: f64,
}

/// Which committed chunks are listed under each bucket, for one sketch version.
#[derive(Debug, Clone)]
pub struct SketchBucketDirectory {
    generation: u64,
    buckets: Vec<Vec<usize>>,
    capacity: usize,
}

impl SketchBucketDirectory {
    /// Assign each chunk (by leaf index = position in `embeddings`) to up to
    /// `assignments_per_chunk` nearest buckets, never letting a bucket exceed
    /// `ceil(N · a / B · balance_slack)` members.
    pub fn build(
        encoder: &SketchEncoder,
        embeddings: &[Vec<f32>],
        assignments_per_chunk: usize,
        balance_slack: f64,
    ) -> PccResult<Self> {
        let num_buckets = encoder.num_buckets();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != encoder.dimensions()) {
            return Err(RetrievalError::DimensionMismatch {
                expected: encoder.dimensions(),
                actual: bad.len(),
            }
            .into());
        }
        let per_chunk = assignments_per_chunk.clamp(1, num_buckets.max(1));

        let mut pairs: Vec<(f32, usize, usize)> = Vec::with_capacity(embeddings.len() * num_buckets);
        for (leaf, e) in embeddings.iter().enumerate() {
            for (b, c) in encoder.centroids().iter().enumerate() {
                pairs.push((cosine(e, c), leaf, b));
            }
        }
        pairs.sort_by(|x, y| {
            y.0.total_cmp(&x.0)
                .then_with(|| x.1.cmp(&y.1))
                .then_with(|| x.2.cmp(&y.2))
        });

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); num_buckets];
        let mut taken: Vec<Vec<usize>> = vec![Vec::new(); embeddings.len()];
        let mut capacity = 0;

        // One round per assignment so every chunk gets its primary bucket
        // before any chunk gets a secondary one.
        for round in 1..=per_chunk {
            capacity = bucket_capacity(embeddings.len() * round, num_buckets, balance_slack);
            for &(_, leaf, b) in &pairs {
                if taken[leaf].len() < round && buckets[b].len() < capacity && !taken[leaf].contains(&b) {
                    buckets[b].push(leaf);
                    taken[leaf].push(b);
                }
            }
        }

        let unassigned = taken.iter().filter(|t| t.is_empty()).count();
        if unassigned > 0 {
            warn!(unassigned, "chunks left without a bucket");
        }
        for b in &mut buckets {
            b.sort_unstable();
        }

        let directory = Self {
            generation: encoder.version(),
            buckets,
            capacity,
        };
        debug!(
            generation = directory.generation,
            stats = ?directory.occupancy(),
            "bucket directory built"
        );
        Ok(directory)
    }

    /// Sketch version this directory was built from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bucket(&self, bucket: u32) -> Option<&[usize]> {
        self.buckets.get(bucket as usize).map(Vec::as_slice)
    }

    /// Sorted, deduplicated leaf indices listed under any of `buckets`.
    pub fn candidates(&self, buckets: &[u32]) -> PccResult<Vec<usize>> {
        let mut out = Vec::new();
        for &b in buckets {
            let members = self.bucket(b).ok_or(RetrievalError::UnknownBucket {
                bucket: b,
                num_buckets: self.buckets.len(),
            })?;
            out.extend_from_slice(members);
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    pub fn occupancy(&self) -> OccupancyStats {
        let sizes: Vec<usize> = self.buckets.iter().map(Vec::len).collect();
        let min = sizes.iter().copied().min().unwrap_or(0);
        let max = sizes.iter().copied().max().unwrap_or(0);
        let mean = if sizes.is_empty() {
            0.0
        } else {
            sizes.iter().sum::<usize>() as f64 / sizes.len() as f64
        };
        let balance_ratio = if mean > 0.0 { max as f64 / mean } else { 0.0 };
        OccupancyStats {
            min,
            max,
            mean,
            balance_ratio,
        }
    }
}
