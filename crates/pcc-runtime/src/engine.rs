//! PccEngine: the synchronous request pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use pcc_certificate::{CertificateAssembler, CertificateContext, CertificateVerifier};
use pcc_commitment::CommitmentBuilder;
use pcc_core::config::PccConfig;
use pcc_core::errors::{BudgetResource, CommitmentError, PccError, PccResult};
use pcc_core::models::{CoverageCertificate, Document, EvidenceSpan, Policy};
use pcc_core::traits::{IClaimDecoder, IEmbeddingProvider, IEntailmentScorer, ISpanStore};
use pcc_embeddings::EmbeddingEngine;
use pcc_generation::{ExtractiveDecoder, Generator};
use pcc_learning::{credit_spans, LearnerStatsSnapshot, OnlineLearner};
use pcc_retrieval::{PqIndex, ProductQuantizer};
use pcc_sketch::{SketchBucketDirectory, SketchEncoder};
use pcc_verifier::{ClaimVerifier, LexicalEntailment};
use rayon::prelude::*;
use tracing::{debug, info, info_span, instrument, warn};

use crate::answer::Answer;
use crate::budget::Budget;
use crate::cancellation::RequestCancellation;
use crate::publisher::SnapshotPublisher;
use crate::snapshot::{Snapshot, SnapshotCell};
use crate::store::InMemorySpanStore;

/// Fixed per-span overhead used when charging certificate bytes.
const CERTIFIED_SPAN_OVERHEAD: u64 = 96;

pub struct PccEngineBuilder {
    config: PccConfig,
    embedder: Option<Arc<dyn IEmbeddingProvider>>,
    decoder: Option<Arc<dyn IClaimDecoder>>,
    scorer: Option<Arc<dyn IEntailmentScorer>>,
    multiproof: bool,
}

impl PccEngineBuilder {
    pub fn embedder(mut self, embedder: Arc<dyn IEmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn IClaimDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn scorer(mut self, scorer: Arc<dyn IEntailmentScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Attach a multi-proof to every certificate. On by default.
    pub fn multiproof(mut self, include: bool) -> Self {
        self.multiproof = include;
        self
    }

    /// Validate the config, commit `documents` as epoch 1, and start the
    /// learner when enabled.
    pub fn build(self, documents: &[Document]) -> PccResult<PccEngine> {
        self.config.validate()?;
        let embedder: Arc<dyn IEmbeddingProvider> = match self.embedder {
            Some(e) => e,
            None => Arc::new(EmbeddingEngine::new(&self.config.embedding)),
        };
        let decoder: Arc<dyn IClaimDecoder> = match self.decoder {
            Some(d) => d,
            None => Arc::new(ExtractiveDecoder::default()),
        };
        let scorer: Arc<dyn IEntailmentScorer> = match self.scorer {
            Some(s) => s,
            None => Arc::new(LexicalEntailment),
        };

        let mut initial = build_snapshot(&self.config, embedder.as_ref(), documents, 1)?;
        initial.generation = 1;
        let cell = Arc::new(SnapshotCell::new(initial));

        let learner = if self.config.learner.enabled {
            let publisher = SnapshotPublisher::new(Arc::clone(&cell), self.config.sketch.clone());
            Some(OnlineLearner::start(&self.config.learner, Arc::new(publisher))?)
        } else {
            None
        };

        info!(
            embedder = embedder.name(),
            decoder = decoder.name(),
            scorer = scorer.name(),
            learner = learner.is_some(),
            "PccEngine initialized"
        );
        Ok(PccEngine {
            generator: Generator::new(decoder, self.config.verifier.token_cache_size),
            verifier: ClaimVerifier::new(&self.config.verifier, scorer),
            assembler: CertificateAssembler::new().with_multiproof(self.multiproof),
            config: self.config,
            embedder,
            cell,
            learner,
        })
    }
}

pub struct PccEngine {
    config: PccConfig,
    embedder: Arc<dyn IEmbeddingProvider>,
    generator: Generator,
    verifier: ClaimVerifier,
    assembler: CertificateAssembler,
    cell: Arc<SnapshotCell>,
    learner: Option<OnlineLearner>,
}

impl PccEngine {
    pub fn builder(config: PccConfig) -> PccEngineBuilder {
        PccEngineBuilder {
            config,
            embedder: None,
            decoder: None,
            scorer: None,
            multiproof: true,
        }
    }

    pub fn config(&self) -> &PccConfig {
        &self.config
    }

    /// Pin the current snapshot.
    pub fn snapshot(&self) -> PccResult<Arc<Snapshot>> {
        self.cell.pin()
    }

    pub fn live_generations(&self) -> Vec<u64> {
        self.cell.live_generations()
    }

    /// Replace the corpus with `documents` as the next epoch.
    ///
    /// Requests already running finish against the epoch they pinned, and
    /// fail with `CertificateMismatch` if the root changed under them.
    pub fn recommit(&self, documents: &[Document]) -> PccResult<u64> {
        let config = &self.config;
        let embedder = self.embedder.as_ref();
        self.cell
            .publish(|current| build_snapshot(config, embedder, documents, current.epoch() + 1))
    }

    /// Answer `query` under `policy`.
    ///
    /// Runs embed, sketch, retrieve, fetch, certify, generate and verify in
    /// order against one pinned snapshot. Any budget breach aborts the
    /// request without a certificate.
    pub fn answer(&self, query: &str, policy: &Policy) -> PccResult<Answer> {
        self.answer_with_cancellation(query, policy, &RequestCancellation::new())
    }

    /// [`answer`](Self::answer) for a caller that may give up early.
    ///
    /// A request cancelled before it finishes submits no learner feedback
    /// and fails with `BudgetExceeded` at stage `cancelled`.
    #[instrument(skip_all, fields(query_len = query.len()))]
    pub fn answer_with_cancellation(
        &self,
        query: &str,
        policy: &Policy,
        cancel: &RequestCancellation,
    ) -> PccResult<Answer> {
        let budget = Budget::new(policy);
        let snapshot = self.cell.pin()?;
        let _span = info_span!(
            "pcc.answer",
            generation = snapshot.generation,
            epoch = snapshot.epoch()
        )
        .entered();

        let query_embedding = self.embedder.embed(query)?;
        budget.check("embed")?;

        let sketch = {
            let _s = pcc_core::sketch_span!(snapshot.encoder.version()).entered();
            snapshot.encoder.encode(&query_embedding)?
        };
        budget.check("sketch")?;

        let outcome = {
            let _s = pcc_core::retrieval_span!(sketch.buckets.len(), policy.max_spans()).entered();
            snapshot.retriever(&self.config.retrieval).search_with_checkpoint(
                &sketch,
                &query_embedding,
                policy.max_spans(),
                || budget.check("retrieve"),
            )?
        };
        budget.charge(
            "retrieve",
            (outcome.candidates_scanned * snapshot.index.candidate_bytes()) as u64,
        )?;
        if let Some(event) = &outcome.degradation {
            warn!(
                component = %event.component,
                fallback = %event.fallback_used,
                "retrieval degraded"
            );
        }

        let evidence = self.fetch(snapshot.store.as_ref(), &outcome.spans, &budget)?;
        budget.check("fetch")?;

        let certificate = {
            let _s = pcc_core::certify_span!(outcome.spans.len()).entered();
            let cert = self.assembler.assemble(
                &snapshot.commitment,
                &outcome.spans,
                CertificateContext {
                    tau: policy.tau(),
                    sketch_version: outcome.sketch_version.clone(),
                    retriever_version: outcome.retriever_version.clone(),
                    snapshot_generation: snapshot.generation,
                    degraded: outcome.degraded,
                },
            )?;
            for e in &evidence {
                CertificateVerifier::verify_span_text(&cert, e.span.leaf_index, &e.text)?;
            }
            cert
        };
        budget.charge("certify", certificate_bytes(&certificate))?;
        budget.check("certify")?;

        let draft = {
            let _s = pcc_core::generate_span!(self.generator.decoder_name()).entered();
            self.generator.generate(query, &evidence, &certificate, policy)?
        };
        budget.check("generate")?;

        let texts: HashMap<usize, &str> = evidence
            .iter()
            .map(|e| (e.span.leaf_index, e.text.as_str()))
            .collect();
        let span_texts: Vec<String> = certificate
            .spans
            .iter()
            .map(|s| texts.get(&s.leaf_index).map(|t| t.to_string()).unwrap_or_default())
            .collect();
        let decisions =
            self.verifier
                .verify_draft(&draft, &span_texts, policy, Some(budget.deadline()))?;

        // The corpus may have been recommitted while this request ran.
        let latest = self.cell.pin()?;
        CertificateVerifier::verify(&certificate, &latest.root())?;

        if !cancel.begin_delivery() {
            debug!(elapsed_ms = budget.elapsed_ms(), "request cancelled, feedback withheld");
            return Err(PccError::BudgetExceeded {
                resource: BudgetResource::Latency,
                stage: "cancelled".to_string(),
                used: budget.elapsed_ms(),
                limit: policy.latency_budget_ms(),
            });
        }

        if let Some(learner) = &self.learner {
            if let Some(event) = credit_spans(
                &certificate,
                &draft,
                &decisions,
                &query_embedding,
                sketch.version,
                &sketch.buckets,
                snapshot.encoder.num_buckets() as u32,
            ) {
                if let Err(e) = learner.submit(event) {
                    debug!(error = %e, "feedback not queued");
                }
            }
        }

        let answer = Answer {
            status: Answer::fold_status(&decisions),
            draft,
            certificate,
            decisions,
            elapsed_ms: budget.elapsed_ms(),
        };
        info!(
            status = %answer.status,
            disposition = ?answer.disposition(),
            degraded = answer.degraded(),
            claims = answer.draft.claims.len(),
            elapsed_ms = answer.elapsed_ms,
            "request answered"
        );
        Ok(answer)
    }

    /// Answer independent requests in parallel. Results keep input order.
    pub fn answer_batch(&self, requests: &[(String, Policy)]) -> Vec<PccResult<Answer>> {
        requests
            .par_iter()
            .map(|(query, policy)| self.answer(query, policy))
            .collect()
    }

    pub fn learner_stats(&self) -> Option<LearnerStatsSnapshot> {
        self.learner.as_ref().map(|l| l.stats())
    }

    /// How many credited feedback events for `leaf_index` reached a
    /// published update.
    pub fn learner_credit(&self, leaf_index: usize) -> u64 {
        self.learner
            .as_ref()
            .map_or(0, |l| l.credit_count(leaf_index))
    }

    /// Drain and stop the learner. Answers keep working without it.
    pub fn shutdown_learner(&self) -> Option<LearnerStatsSnapshot> {
        self.learner.as_ref().map(|l| l.shutdown())
    }

    fn fetch(
        &self,
        store: &dyn ISpanStore,
        spans: &[pcc_core::models::RetrievedSpan],
        budget: &Budget,
    ) -> PccResult<Vec<EvidenceSpan>> {
        let mut evidence = Vec::with_capacity(spans.len());
        for span in spans {
            let record = store
                .fetch(span.leaf_index)?
                .ok_or(CommitmentError::LeafOutOfRange {
                    index: span.leaf_index,
                    leaf_count: store.len(),
                })?;
            budget.charge("fetch", record.text.len() as u64)?;
            evidence.push(EvidenceSpan {
                span: span.clone(),
                text: record.text,
            });
        }
        Ok(evidence)
    }
}

/// Commit `documents` and train every retrieval structure over them.
fn build_snapshot(
    config: &PccConfig,
    embedder: &dyn IEmbeddingProvider,
    documents: &[Document],
    epoch: u64,
) -> PccResult<Snapshot> {
    let _span = pcc_core::commit_span!(documents.len()).entered();
    let commitment = CommitmentBuilder::new(config.commitment.clone()).commit(documents, epoch)?;
    let texts: Vec<String> = commitment.records().iter().map(|r| r.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts)?;

    let quantizer = ProductQuantizer::train(&config.retrieval, &embeddings)?;
    let index = PqIndex::build(quantizer, commitment.records(), &embeddings)?;
    let encoder = SketchEncoder::train(&config.sketch, &embeddings)?;
    let directory = SketchBucketDirectory::build(
        &encoder,
        &embeddings,
        config.sketch.assignments_per_chunk,
        config.sketch.balance_slack,
    )?;

    Ok(Snapshot {
        generation: 0,
        store: Arc::new(InMemorySpanStore::from_commitment(&commitment)),
        commitment: Arc::new(commitment),
        encoder: Arc::new(encoder),
        directory: Arc::new(directory),
        index: Arc::new(index),
    })
}

fn certificate_bytes(cert: &CoverageCertificate) -> u64 {
    let spans: u64 = cert
        .spans
        .iter()
        .map(|s| CERTIFIED_SPAN_OVERHEAD + s.doc_id.len() as u64 + 32 * s.branch.len() as u64)
        .sum();
    let multiproof = cert
        .multiproof
        .as_ref()
        .map_or(0, |m| 48 * m.nodes.len() as u64 + 8 * m.leaf_indices.len() as u64);
    spans + multiproof
}
