use chrono::Utc;
use pcc_core::models::{FeedbackEvent, SpanCredit, SpanRef};
use pcc_learning::{build_update, clip_to_norm, GaussianMechanism, UpdateParams};
use proptest::prelude::*;

proptest! {
    #[test]
    fn clipping_bounds_the_norm(
        mut v in prop::collection::vec(-100.0f64..100.0, 0..32),
        clip in 0.01f64..10.0,
    ) {
        let before = v.clone();
        clip_to_norm(&mut v, clip);
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        prop_assert!(norm <= clip + 1e-9);
        // Direction is preserved.
        for (a, b) in before.iter().zip(&v) {
            prop_assert!(a * b >= 0.0);
        }
    }

    // Without noise, one event's whole update is inside the clipping ball.
    #[test]
    fn single_event_influence_is_bounded(
        query in prop::collection::vec(-5.0f32..5.0, 1..16),
        buckets in prop::collection::btree_set(0u32..8, 0..4),
        leaves in prop::collection::btree_set(0usize..64, 0..6),
        learning_rate in 0.0f64..2.0,
        prior_step in 0.0f64..2.0,
        clip in 0.1f64..3.0,
    ) {
        let event = FeedbackEvent {
            query_embedding: query,
            epoch: 1,
            sketch_version: 1,
            buckets: buckets.into_iter().collect(),
            num_buckets: 8,
            leaf_count: 64,
            credited: leaves
                .into_iter()
                .map(|l| SpanCredit { span: SpanRef::new("d", l as u32), leaf_index: l, reward: 1.0 })
                .collect(),
            timestamp: Utc::now(),
        };
        let params = UpdateParams { learning_rate, prior_step, clip_norm: clip };
        let mut mechanism = GaussianMechanism::new(clip, 0.0, Some(0)).unwrap();
        let updates = build_update(&[event], &params, &mut mechanism);
        prop_assert_eq!(updates.len(), 1);

        let u = &updates[0];
        let sq: f64 = u
            .centroid_deltas
            .iter()
            .flat_map(|d| d.delta.iter().map(|&x| (x as f64).powi(2)))
            .chain(u.prior_deltas.iter().map(|p| (p.delta as f64).powi(2)))
            .sum();
        prop_assert!(sq.sqrt() <= clip * (1.0 + 1e-5));
    }
}
