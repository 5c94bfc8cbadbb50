//! Product quantizer: `m` subspaces × `k` centroids, 8-bit codes.

use pcc_core::config::RetrievalConfig;
use pcc_core::errors::{PccResult, RetrievalError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Per-query inner products against every centroid of every subspace.
#[derive(Debug, Clone)]
pub struct LookupTable {
    /// `[m][k]`
    table: Vec<Vec<f32>>,
}

impl LookupTable {
    /// Approximate inner product between the query and a coded vector.
    pub fn score(&self, codes: &[u8]) -> f32 {
        self.table
            .iter()
            .zip(codes)
            .map(|(sub, &c)| sub.get(c as usize).copied().unwrap_or(0.0))
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct ProductQuantizer {
    m: usize,
    dims_per_subspace: usize,
    /// `[m][k][dims_per_subspace]`
    centroids: Vec<Vec<Vec<f32>>>,
}

impl ProductQuantizer {
    /// Train on `vectors`. Each subspace gets `min(k, n)` centroids.
    pub fn train(config: &RetrievalConfig, vectors: &[Vec<f32>]) -> PccResult<Self> {
        let dims = match vectors.first() {
            Some(v) => v.len(),
            None => {
                return Err(RetrievalError::TrainingFailed {
                    reason: "no training vectors".into(),
                }
                .into())
            }
        };
        let m = config.pq_subspaces;
        if m == 0 || dims % m != 0 {
            return Err(RetrievalError::TrainingFailed {
                reason: format!("{dims} dimensions not divisible into {m} subspaces"),
            }
            .into());
        }
        if config.pq_centroids == 0 || config.pq_centroids > 256 {
            return Err(RetrievalError::TrainingFailed {
                reason: format!("{} centroids do not fit 8-bit codes", config.pq_centroids),
            }
            .into());
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
            return Err(RetrievalError::DimensionMismatch {
                expected: dims,
                actual: bad.len(),
            }
            .into());
        }

        let dims_per_subspace = dims / m;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut centroids = Vec::with_capacity(m);
        for s in 0..m {
            let start = s * dims_per_subspace;
            let sub: Vec<&[f32]> = vectors
                .iter()
                .map(|v| &v[start..start + dims_per_subspace])
                .collect();
            centroids.push(kmeans(&sub, config.pq_centroids, config.pq_iterations, &mut rng));
        }
        debug!(m, k = config.pq_centroids, dims, "product quantizer trained");

        Ok(Self {
            m,
            dims_per_subspace,
            centroids,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.m * self.dims_per_subspace
    }

    pub fn subspaces(&self) -> usize {
        self.m
    }

    fn check_dims(&self, vector: &[f32]) -> PccResult<()> {
        if vector.len() != self.dimensions() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimensions(),
                actual: vector.len(),
            }
            .into());
        }
        Ok(())
    }

    fn subvector<'a>(&self, vector: &'a [f32], s: usize) -> &'a [f32] {
        let start = s * self.dims_per_subspace;
        &vector[start..start + self.dims_per_subspace]
    }

    pub fn encode(&self, vector: &[f32]) -> PccResult<Vec<u8>> {
        self.check_dims(vector)?;
        Ok((0..self.m)
            .map(|s| nearest(self.subvector(vector, s), &self.centroids[s]) as u8)
            .collect())
    }

    /// Approximate reconstruction from codes.
    pub fn decode(&self, codes: &[u8]) -> PccResult<Vec<f32>> {
        if codes.len() != self.m {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.m,
                actual: codes.len(),
            }
            .into());
        }
        let mut out = Vec::with_capacity(self.dimensions());
        for (s, &c) in codes.iter().enumerate() {
            match self.centroids[s].get(c as usize) {
                Some(centroid) => out.extend_from_slice(centroid),
                None => out.extend(std::iter::repeat(0.0).take(self.dims_per_subspace)),
            }
        }
        Ok(out)
    }

    pub fn lookup_table(&self, query: &[f32]) -> PccResult<LookupTable> {
        self.check_dims(query)?;
        let table = (0..self.m)
            .map(|s| {
                let q = self.subvector(query, s);
                self.centroids[s]
                    .iter()
                    .map(|c| q.iter().zip(c).map(|(a, b)| a * b).sum())
                    .collect()
            })
            .collect();
        Ok(LookupTable { table })
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(v: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(v, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

fn kmeans(vectors: &[&[f32]], k: usize, iterations: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f32>> {
    let k = k.min(vectors.len());
    let dims = vectors.first().map_or(0, |v| v.len());

    let mut order: Vec<usize> = (0..vectors.len()).collect();
    order.shuffle(rng);
    let mut centroids: Vec<Vec<f32>> = order.iter().take(k).map(|&i| vectors[i].to_vec()).collect();

    for _ in 0..iterations {
        let mut sums = vec![vec![0.0f32; dims]; k];
        let mut counts = vec![0usize; k];
        for v in vectors {
            let c = nearest(v, &centroids);
            counts[c] += 1;
            for (s, x) in sums[c].iter_mut().zip(v.iter()) {
                *s += x;
            }
        }
        for (c, sum) in sums.into_iter().enumerate() {
            if counts[c] > 0 {
                let n = counts[c] as f32;
                centroids[c] = sum.into_iter().map(|x| x / n).collect();
            }
        }
    }
    centroids
}
