//! L2 clipping and the Gaussian mechanism.

use pcc_core::errors::{LearnerError, PccResult};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Scale `v` down so its L2 norm is at most `clip_norm`. Returns the norm
/// before clipping.
pub fn clip_to_norm(v: &mut [f64], clip_norm: f64) -> f64 {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > clip_norm && norm > 0.0 {
        let scale = clip_norm / norm;
        for x in v.iter_mut() {
            *x *= scale;
        }
    }
    norm
}

/// Adds N(0, sigma^2) noise with `sigma = noise_multiplier * clip_norm`.
pub struct GaussianMechanism {
    sigma: f64,
    normal: Option<Normal<f64>>,
    rng: ChaCha8Rng,
}

impl GaussianMechanism {
    /// `seed = None` draws the RNG seed from the OS.
    pub fn new(clip_norm: f64, noise_multiplier: f64, seed: Option<u64>) -> PccResult<Self> {
        if clip_norm.is_nan() || clip_norm <= 0.0 || noise_multiplier.is_nan() || noise_multiplier < 0.0 {
            return Err(LearnerError::InvalidPrivacy {
                reason: format!(
                    "clip_norm must be > 0 and noise_multiplier >= 0, got {clip_norm} and {noise_multiplier}"
                ),
            }
            .into());
        }
        let sigma = noise_multiplier * clip_norm;
        let normal = if sigma > 0.0 {
            Some(
                Normal::new(0.0, sigma).map_err(|e| LearnerError::InvalidPrivacy {
                    reason: e.to_string(),
                })?,
            )
        } else {
            None
        };
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self { sigma, normal, rng })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Add independent noise to every coordinate of `v`.
    pub fn add_noise(&mut self, v: &mut [f64]) {
        if let Some(normal) = &self.normal {
            for x in v.iter_mut() {
                *x += normal.sample(&mut self.rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_scales_long_vectors() {
        let mut v = vec![3.0, 4.0];
        assert_eq!(clip_to_norm(&mut v, 1.0), 5.0);
        assert!((v[0] - 0.6).abs() < 1e-12);
        assert!((v[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn clip_leaves_short_vectors() {
        let mut v = vec![0.1, 0.2];
        clip_to_norm(&mut v, 1.0);
        assert_eq!(v, vec![0.1, 0.2]);
    }

    #[test]
    fn zero_noise_is_identity() {
        let mut m = GaussianMechanism::new(1.0, 0.0, Some(1)).unwrap();
        let mut v = vec![0.5, -0.5];
        m.add_noise(&mut v);
        assert_eq!(v, vec![0.5, -0.5]);
        assert_eq!(m.sigma(), 0.0);
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let mut a = GaussianMechanism::new(1.0, 1.1, Some(9)).unwrap();
        let mut b = GaussianMechanism::new(1.0, 1.1, Some(9)).unwrap();
        let mut x = vec![0.0; 8];
        let mut y = vec![0.0; 8];
        a.add_noise(&mut x);
        b.add_noise(&mut y);
        assert_eq!(x, y);
        assert!(x.iter().any(|v| *v != 0.0));
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(GaussianMechanism::new(0.0, 1.0, None).is_err());
        assert!(GaussianMechanism::new(1.0, -0.1, None).is_err());
        assert!(GaussianMechanism::new(f64::NAN, 1.0, None).is_err());
    }
}
