#![allow(dead_code)]

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pcc_core::config::PccConfig;
use pcc_core::errors::PccResult;
use pcc_core::models::{
    ClaimStatus, Document, EvidenceSpan, Policy, PolicySpec, ProposedClaim,
};
use pcc_core::traits::{IClaimDecoder, IEntailmentScorer};
use pcc_generation::ExtractiveDecoder;
use pcc_runtime::PccEngine;
use serde::Deserialize;

pub const CAPITAL_QUERY: &str = "What is the capital of France?";

/// Leaf of the geography document in the small corpus (doc ids sort first).
pub const GEOGRAPHY_LEAF: usize = 2;

#[derive(Debug, Deserialize)]
pub struct EntailmentSpec {
    pub score: f64,
    pub delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Expected {
    pub status: ClaimStatus,
    pub coverage: f64,
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub corpus: String,
    pub query: String,
    pub policy: PolicySpec,
    pub config_toml: String,
    pub claims: Option<Vec<ProposedClaim>>,
    pub entailment: EntailmentSpec,
    pub expected: Expected,
}

impl Scenario {
    pub fn load(path: &str) -> Self {
        test_fixtures::load_fixture(path)
    }

    pub fn policy(&self) -> Policy {
        Policy::try_from(self.policy).unwrap()
    }

    /// Engine for this scenario, learner off so generations stay fixed.
    pub fn engine(&self) -> PccEngine {
        let mut config = PccConfig::from_toml(&self.config_toml).unwrap();
        config.learner.enabled = false;
        let mut builder = PccEngine::builder(config).scorer(Arc::new(FixedScorer {
            score: self.entailment.score,
            delay: Duration::from_millis(self.entailment.delay_ms),
        }));
        if let Some(claims) = &self.claims {
            builder = builder.decoder(Arc::new(pcc_generation::ScriptedDecoder::new(
                claims.clone(),
            )));
        }
        builder.build(&small_corpus()).unwrap()
    }
}

pub fn small_corpus() -> Vec<Document> {
    test_fixtures::load_fixture("corpus/small_corpus.json")
}

pub fn config() -> PccConfig {
    PccConfig::from_toml(
        "[embedding]\ndimensions = 64\n\n[retrieval]\npq_subspaces = 4\n\n\
         [sketch]\nnum_buckets = 2\nprobes = 2\nmin_affinity = -1.0\n",
    )
    .unwrap()
}

pub fn policy() -> Policy {
    Policy::new(0.9, 0.7, 4, 5_000, 16).unwrap()
}

/// Scores every claim the same, optionally after sleeping.
pub struct FixedScorer {
    pub score: f64,
    pub delay: Duration,
}

impl IEntailmentScorer for FixedScorer {
    fn score(&self, _claim: &str, _evidence: &[String]) -> PccResult<f64> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(self.score)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Extractive decoding after a fixed pause.
pub struct SlowDecoder {
    pub delay: Duration,
}

impl IClaimDecoder for SlowDecoder {
    fn decode(&self, query: &str, evidence: &[EvidenceSpan]) -> PccResult<Vec<ProposedClaim>> {
        std::thread::sleep(self.delay);
        ExtractiveDecoder::default().decode(query, evidence)
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Signals when decoding starts, then waits for permission to continue.
pub struct GatedDecoder {
    started: Mutex<Sender<()>>,
    resume: Mutex<Receiver<()>>,
}

impl GatedDecoder {
    /// The decoder, the "started" receiver and the "resume" sender.
    pub fn new() -> (Self, Receiver<()>, Sender<()>) {
        let (started_tx, started_rx) = channel();
        let (resume_tx, resume_rx) = channel();
        let decoder = Self {
            started: Mutex::new(started_tx),
            resume: Mutex::new(resume_rx),
        };
        (decoder, started_rx, resume_tx)
    }
}

impl IClaimDecoder for GatedDecoder {
    fn decode(&self, query: &str, evidence: &[EvidenceSpan]) -> PccResult<Vec<ProposedClaim>> {
        let _ = self.started.lock().unwrap().send(());
        let _ = self.resume.lock().unwrap().recv();
        ExtractiveDecoder::default().decode(query, evidence)
    }

    fn name(&self) -> &str {
        "gated"
    }
}
