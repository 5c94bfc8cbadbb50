//! Sketch encoder: query embedding to a small set of bucket ids.

use std::sync::Arc;

use pcc_core::config::SketchConfig;
use pcc_core::errors::{PccResult, RetrievalError};
use pcc_core::models::CentroidDelta;
use pcc_embeddings::{cosine, l2_normalize};
use serde::Serialize;
use tracing::{debug, info};

use crate::training::train_balanced;
use crate::version_tag;

/// Buckets selected for one query, strongest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SketchOutput {
    pub buckets: Vec<u32>,
    /// Cosine affinity per emitted bucket, aligned with `buckets`.
    pub affinities: Vec<f32>,
    /// Parameter version that produced this output.
    pub version: u64,
}

impl SketchOutput {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn version_tag(&self) -> String {
        version_tag(self.version)
    }
}

/// Immutable sketch parameters. New versions come from
/// [`SketchEncoder::apply_centroid_deltas`].
#[derive(Debug, Clone)]
pub struct SketchEncoder {
    version: u64,
    centroids: Arc<Vec<Vec<f32>>>,
    dims: usize,
    probes: usize,
    min_affinity: f32,
}

impl SketchEncoder {
    /// Train version 1 from chunk embeddings.
    ///
    /// With fewer chunks than configured buckets, one bucket per chunk is used.
    pub fn train(config: &SketchConfig, embeddings: &[Vec<f32>]) -> PccResult<Self> {
        let dims = match embeddings.first() {
            Some(e) => e.len(),
            None => {
                return Err(RetrievalError::TrainingFailed {
                    reason: "no chunk embeddings".into(),
                }
                .into())
            }
        };
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dims) {
            return Err(RetrievalError::DimensionMismatch {
                expected: dims,
                actual: bad.len(),
            }
            .into());
        }

        let k = config.num_buckets.min(embeddings.len());
        let centroids = train_balanced(
            embeddings,
            k,
            config.balance_slack,
            config.kmeans_iterations,
            config.seed,
        );
        info!(buckets = k, dims, "sketch encoder trained");

        Ok(Self::from_centroids(1, centroids, config.probes, config.min_affinity))
    }

    pub fn from_centroids(
        version: u64,
        centroids: Vec<Vec<f32>>,
        probes: usize,
        min_affinity: f32,
    ) -> Self {
        let dims = centroids.first().map_or(0, Vec::len);
        Self {
            version,
            centroids: Arc::new(centroids),
            dims,
            probes,
            min_affinity,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn num_buckets(&self) -> usize {
        self.centroids.len()
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    pub fn centroids(&self) -> &[Vec<f32>] {
        &self.centroids
    }

    /// Affinity of `embedding` to every bucket.
    pub fn affinities(&self, embedding: &[f32]) -> PccResult<Vec<f32>> {
        if embedding.len() != self.dims {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dims,
                actual: embedding.len(),
            }
            .into());
        }
        Ok(self.centroids.iter().map(|c| cosine(embedding, c)).collect())
    }

    /// Top `probes` buckets with affinity at least `min_affinity`.
    ///
    /// Deterministic: ties break by ascending bucket id. An empty output is a
    /// valid answer for out-of-distribution queries.
    pub fn encode(&self, query: &[f32]) -> PccResult<SketchOutput> {
        let mut scored: Vec<(u32, f32)> = self
            .affinities(query)?
            .into_iter()
            .enumerate()
            .map(|(b, a)| (b as u32, a))
            .filter(|&(_, a)| a >= self.min_affinity)
            .collect();
        scored.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
        scored.truncate(self.probes);

        let output = SketchOutput {
            buckets: scored.iter().map(|&(b, _)| b).collect(),
            affinities: scored.iter().map(|&(_, a)| a).collect(),
            version: self.version,
        };
        debug!(
            version = self.version,
            buckets = ?output.buckets,
            "query sketched"
        );
        Ok(output)
    }

    /// New encoder at `version + 1` with `deltas` added and centroids renormalized.
    pub fn apply_centroid_deltas(&self, deltas: &[CentroidDelta]) -> PccResult<Self> {
        let mut centroids = self.centroids.as_ref().clone();
        for d in deltas {
            let Some(target) = centroids.get_mut(d.bucket as usize) else {
                return Err(RetrievalError::UnknownBucket {
                    bucket: d.bucket,
                    num_buckets: self.num_buckets(),
                }
                .into());
            };
            if d.delta.len() != self.dims {
                return Err(RetrievalError::DimensionMismatch {
                    expected: self.dims,
                    actual: d.delta.len(),
                }
                .into());
            }
            for (c, x) in target.iter_mut().zip(&d.delta) {
                *c += x;
            }
        }
        for c in centroids.iter_mut() {
            l2_normalize(c);
        }
        Ok(Self {
            version: self.version + 1,
            centroids: Arc::new(centroids),
            dims: self.dims,
            probes: self.probes,
            min_affinity: self.min_affinity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis_encoder() -> SketchEncoder {
        SketchEncoder::from_centroids(
            1,
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]],
            2,
            0.1,
        )
    }

    #[test]
    fn emits_top_probes_in_affinity_order() {
        let out = axis_encoder().encode(&[0.2, 0.9, 0.4]).unwrap();
        assert_eq!(out.buckets, vec![1, 2]);
        assert_eq!(out.version, 1);
        assert_eq!(out.version_tag(), "sketch-v1");
    }

    #[test]
    fn out_of_distribution_query_is_empty() {
        let out = axis_encoder().encode(&[-1.0, -1.0, -1.0]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        assert!(axis_encoder().encode(&[1.0, 0.0]).is_err());
    }

    #[test]
    fn deltas_bump_version_and_leave_original() {
        let enc = axis_encoder();
        let next = enc
            .apply_centroid_deltas(&[CentroidDelta {
                bucket: 0,
                delta: vec![0.0, 1.0, 0.0],
            }])
            .unwrap();
        assert_eq!(next.version(), 2);
        assert_eq!(enc.centroids()[0], vec![1.0, 0.0, 0.0]);
        assert!(next.centroids()[0][1] > 0.5);
    }

    #[test]
    fn unknown_bucket_delta_fails() {
        let err = axis_encoder()
            .apply_centroid_deltas(&[CentroidDelta {
                bucket: 9,
                delta: vec![0.0; 3],
            }])
            .unwrap_err();
        assert!(err.to_string().contains("unknown bucket 9"));
    }
}
