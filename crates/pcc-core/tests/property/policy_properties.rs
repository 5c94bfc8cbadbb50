use pcc_core::models::{Policy, PolicySpec};
use pcc_core::ErrorKind;
use proptest::prelude::*;

fn spec(tau: f64, min_entailment: f64, max_spans: usize) -> PolicySpec {
    PolicySpec {
        tau,
        min_entailment,
        max_spans,
        latency_budget_ms: 1_000,
        memory_budget_mb: 8,
        decoding: Default::default(),
        on_failure: Default::default(),
    }
}

proptest! {
    #[test]
    fn in_range_specs_build_and_round_trip(
        tau in 0.0f64..=1.0,
        min_e in 0.0f64..=1.0,
        max_spans in 1usize..=256,
    ) {
        let policy = Policy::try_from(spec(tau, min_e, max_spans)).unwrap();
        prop_assert_eq!(policy.tau(), tau);
        prop_assert_eq!(PolicySpec::from(policy), spec(tau, min_e, max_spans));

        let json = serde_json::to_string(&policy).unwrap();
        let back: Policy = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, policy);
    }

    #[test]
    fn tau_itself_satisfies_the_threshold(tau in 0.0f64..=1.0) {
        let policy = Policy::try_from(spec(tau, 0.5, 4)).unwrap();
        prop_assert!(policy.coverage_satisfied(tau));
        if tau >= 1e-9 {
            prop_assert!(!policy.coverage_satisfied(tau - 1e-9));
        }
    }

    #[test]
    fn out_of_range_tau_is_invalid(tau in prop_oneof![-10.0f64..-1e-9, 1.000_001f64..10.0]) {
        let err = Policy::try_from(spec(tau, 0.5, 4)).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::InvalidPolicy);
    }

    #[test]
    fn json_with_bad_tau_is_rejected(tau in 1.5f64..100.0) {
        let json = format!(
            r#"{{"tau":{tau},"min_entailment":0.5,"max_spans":4,"latency_budget_ms":10,"memory_budget_mb":1}}"#
        );
        prop_assert!(serde_json::from_str::<Policy>(&json).is_err());
    }
}
