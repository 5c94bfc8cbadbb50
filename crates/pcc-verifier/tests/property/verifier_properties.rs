use std::sync::Arc;

use pcc_core::config::VerifierConfig;
use pcc_core::errors::PccResult;
use pcc_core::models::{Claim, ClaimStatus, FailureAction, Policy};
use pcc_core::traits::IEntailmentScorer;
use pcc_verifier::ClaimVerifier;
use proptest::prelude::*;

struct Fixed(f64);

impl IEntailmentScorer for Fixed {
    fn score(&self, _claim: &str, _evidence: &[String]) -> PccResult<f64> {
        Ok(self.0)
    }
    fn name(&self) -> &str {
        "fixed"
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Coverage below tau can never be accepted, whatever entailment says.
    #[test]
    fn hard_gate(
        claim_words in prop::collection::vec("[a-e]{1,3}", 0..12),
        span_words in prop::collection::vec("[a-e]{1,3}", 0..12),
        tau in 0.0f64..=1.0,
        entailment in 0.0f64..=1.0,
        flag in any::<bool>(),
        halted in any::<bool>(),
    ) {
        let verifier = ClaimVerifier::new(&VerifierConfig::default(), Arc::new(Fixed(entailment)));
        let mut policy = Policy::new(tau, 0.5, 4, 5_000, 16).unwrap();
        if flag {
            policy = policy.with_on_failure(FailureAction::Flag);
        }
        let claim = Claim {
            claim_id: "c0".into(),
            text: claim_words.join(" "),
            span_indices: vec![0],
            halted,
        };
        let d = verifier.verify_claim(&claim, vec![span_words.join(" ")], &policy, None);

        prop_assert!(d.status.is_terminal());
        prop_assert!((0.0..=1.0).contains(&d.coverage));
        if d.coverage < tau || halted || entailment < 0.5 {
            prop_assert_ne!(d.status, ClaimStatus::Accepted);
        } else {
            prop_assert_eq!(d.status, ClaimStatus::Accepted);
        }
        if !flag {
            prop_assert_ne!(d.status, ClaimStatus::Flagged);
        }
    }
}
