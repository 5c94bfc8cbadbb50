//! Entailment scoring under a time budget.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use pcc_core::errors::{PccResult, VerifierError};
use pcc_core::traits::IEntailmentScorer;
use tracing::{debug, warn};

use crate::tokenizer::tokenize;

/// Tokens this short carry no content for overlap scoring.
const MIN_CONTENT_TOKEN_LEN: usize = 3;

/// Overlap-based scorer: share of the claim's content tokens that appear in
/// the evidence. Deterministic and offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalEntailment;

impl IEntailmentScorer for LexicalEntailment {
    fn score(&self, claim: &str, evidence: &[String]) -> PccResult<f64> {
        let content: Vec<String> = tokenize(claim)
            .into_iter()
            .filter(|t| t.chars().count() >= MIN_CONTENT_TOKEN_LEN)
            .collect();
        if content.is_empty() {
            return Ok(0.0);
        }
        let support: HashSet<String> = evidence.iter().flat_map(|e| tokenize(e)).collect();
        let hits = content.iter().filter(|t| support.contains(*t)).count();
        Ok(hits as f64 / content.len() as f64)
    }

    fn name(&self) -> &str {
        "lexical"
    }
}

struct Job {
    claim: String,
    evidence: Vec<String>,
    deadline: Instant,
    reply: Sender<PccResult<f64>>,
}

/// Fixed set of worker threads running one entailment scorer.
///
/// A late scorer is abandoned, not cancelled; its result is discarded. A
/// hung scorer pins at most `threads` workers, and at most `threads` more
/// calls wait in the queue. Calls beyond that fail with `Saturated`.
/// Scores outside `[0, 1]` or NaN are scorer failures.
pub struct EntailmentPool {
    scorer: Arc<dyn IEntailmentScorer>,
    threads: usize,
    jobs: Sender<Job>,
    queue: Receiver<Job>,
    started: Mutex<bool>,
}

impl EntailmentPool {
    /// Workers start on the first call.
    pub fn new(scorer: Arc<dyn IEntailmentScorer>, threads: usize) -> Self {
        let threads = threads.max(1);
        let (jobs, queue) = crossbeam_channel::bounded(threads);
        Self {
            scorer,
            threads,
            jobs,
            queue,
            started: Mutex::new(false),
        }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    fn start(&self) -> PccResult<()> {
        let mut started = self.started.lock().unwrap_or_else(|p| p.into_inner());
        if *started {
            return Ok(());
        }
        for i in 0..self.threads {
            let scorer = Arc::clone(&self.scorer);
            let queue = self.queue.clone();
            std::thread::Builder::new()
                .name(format!("pcc-entailment-{i}"))
                .spawn(move || {
                    for job in queue.iter() {
                        if Instant::now() >= job.deadline {
                            continue;
                        }
                        let result = scorer.score(&job.claim, &job.evidence);
                        // The caller is gone after a timeout.
                        let _ = job.reply.send(result);
                    }
                })
                .map_err(|e| VerifierError::ScorerFailed {
                    scorer: self.scorer.name().to_string(),
                    reason: e.to_string(),
                })?;
        }
        *started = true;
        debug!(threads = self.threads, scorer = self.scorer.name(), "entailment workers started");
        Ok(())
    }

    /// Score `claim` against `evidence`, waiting at most `timeout`.
    pub fn score(
        &self,
        claim_id: &str,
        claim: &str,
        evidence: Vec<String>,
        timeout: Duration,
    ) -> PccResult<f64> {
        self.start()?;
        let scorer_name = self.scorer.name();
        let (reply, rx) = crossbeam_channel::bounded(1);
        let job = Job {
            claim: claim.to_string(),
            evidence,
            deadline: Instant::now() + timeout,
            reply,
        };

        match self.jobs.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(claim_id, scorer = %scorer_name, capacity = self.threads, "entailment pool saturated");
                return Err(VerifierError::Saturated {
                    scorer: scorer_name.to_string(),
                    capacity: self.threads,
                }
                .into());
            }
            Err(TrySendError::Disconnected(_)) => {
                return Err(VerifierError::ScorerFailed {
                    scorer: scorer_name.to_string(),
                    reason: "entailment workers are gone".into(),
                }
                .into());
            }
        }

        match rx.recv_timeout(timeout) {
            Ok(Ok(score)) if (0.0..=1.0).contains(&score) => Ok(score),
            Ok(Ok(score)) => Err(VerifierError::ScorerFailed {
                scorer: scorer_name.to_string(),
                reason: format!("score {score} outside [0, 1]"),
            }
            .into()),
            Ok(Err(e)) => Err(VerifierError::ScorerFailed {
                scorer: scorer_name.to_string(),
                reason: e.to_string(),
            }
            .into()),
            Err(RecvTimeoutError::Timeout) => {
                warn!(claim_id, scorer = %scorer_name, timeout_ms = timeout.as_millis() as u64, "entailment timed out");
                Err(VerifierError::Timeout {
                    claim_id: claim_id.to_string(),
                    budget_ms: timeout.as_millis() as u64,
                }
                .into())
            }
            Err(RecvTimeoutError::Disconnected) => Err(VerifierError::ScorerFailed {
                scorer: scorer_name.to_string(),
                reason: "worker exited without a result".into(),
            }
            .into()),
        }
    }
}
