//! Capacity-constrained (balanced) spherical k-means.
//!
//! Assignment is greedy over all (point, centroid) pairs in descending cosine
//! order, so no centroid takes more than `capacity` points. Centroids are
//! unit-normalized means of their members.

use pcc_embeddings::{cosine, l2_normalize};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// `ceil(n / k * slack)`, never below `ceil(n / k)`.
pub fn bucket_capacity(n: usize, k: usize, slack: f64) -> usize {
    if k == 0 {
        return n;
    }
    let even = n.div_ceil(k);
    ((n as f64 / k as f64) * slack).ceil().max(even as f64) as usize
}

/// Greedy capacity-limited assignment. Returns the centroid index per point.
pub fn balanced_assign(points: &[Vec<f32>], centroids: &[Vec<f32>], capacity: usize) -> Vec<usize> {
    let mut pairs: Vec<(f32, usize, usize)> = Vec::with_capacity(points.len() * centroids.len());
    for (p, point) in points.iter().enumerate() {
        for (c, centroid) in centroids.iter().enumerate() {
            pairs.push((cosine(point, centroid), p, c));
        }
    }
    pairs.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut assignment = vec![usize::MAX; points.len()];
    let mut load = vec![0usize; centroids.len()];
    let mut remaining = points.len();
    for (_, p, c) in pairs {
        if remaining == 0 {
            break;
        }
        if assignment[p] == usize::MAX && load[c] < capacity {
            assignment[p] = c;
            load[c] += 1;
            remaining -= 1;
        }
    }
    assignment
}

/// Train `k` unit centroids. Requires `points.len() >= k > 0`.
pub fn train_balanced(
    points: &[Vec<f32>],
    k: usize,
    slack: f64,
    iterations: usize,
    seed: u64,
) -> Vec<Vec<f32>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut centroids: Vec<Vec<f32>> = sample(&mut rng, points.len(), k)
        .into_iter()
        .map(|i| points[i].clone())
        .collect();
    let capacity = bucket_capacity(points.len(), k, slack);
    let dims = points.first().map_or(0, Vec::len);

    for _ in 0..iterations {
        let assignment = balanced_assign(points, &centroids, capacity);
        let mut sums = vec![vec![0.0f32; dims]; k];
        let mut counts = vec![0usize; k];
        for (p, &c) in assignment.iter().enumerate() {
            if c == usize::MAX {
                continue;
            }
            counts[c] += 1;
            for (s, x) in sums[c].iter_mut().zip(&points[p]) {
                *s += x;
            }
        }

        let mut moved = false;
        for (c, sum) in sums.into_iter().enumerate() {
            if counts[c] == 0 {
                continue;
            }
            let mut next = sum;
            l2_normalize(&mut next);
            if next != centroids[c] {
                moved = true;
                centroids[c] = next;
            }
        }
        if !moved {
            break;
        }
    }
    centroids
}
