//! Batch folding and the worker loop.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::Utc;
use crossbeam_channel::Receiver;
use dashmap::DashMap;
use pcc_core::config::LearnerConfig;
use pcc_core::errors::{LearnerError, PccError, PccResult};
use pcc_core::models::{CentroidDelta, FeedbackEvent, LearnerUpdate, PriorDelta};
use pcc_core::traits::IParameterPublisher;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::privacy::{clip_to_norm, GaussianMechanism};
use crate::stats::LearnerStats;

/// Step sizes and privacy bounds used when folding a batch.
#[derive(Debug, Clone, Copy)]
pub struct UpdateParams {
    pub learning_rate: f64,
    pub prior_step: f64,
    pub clip_norm: f64,
}

impl From<&LearnerConfig> for UpdateParams {
    fn from(c: &LearnerConfig) -> Self {
        Self {
            learning_rate: c.learning_rate,
            prior_step: c.prior_step,
            clip_norm: c.clip_norm,
        }
    }
}

/// Fold a batch into one update per `(epoch, sketch_version)` group.
///
/// Each event contributes `learning_rate * query` to every bucket it probed
/// and `prior_step * reward` to every credited span. The whole contribution
/// is clipped to `clip_norm` and contributions are summed. Noise is then
/// added to every coordinate of the fixed-size release (all `num_buckets`
/// centroids and all `leaf_count` priors), so the shape of an update never
/// reveals which buckets or spans the batch touched. The noisy sum is
/// averaged over the group.
pub fn build_update(
    batch: &[FeedbackEvent],
    params: &UpdateParams,
    mechanism: &mut GaussianMechanism,
) -> Vec<LearnerUpdate> {
    let mut groups: BTreeMap<(u64, u64), Vec<&FeedbackEvent>> = BTreeMap::new();
    for event in batch {
        groups
            .entry((event.epoch, event.sketch_version))
            .or_default()
            .push(event);
    }

    groups
        .into_iter()
        .map(|((epoch, sketch_version), events)| {
            fold_group(epoch, sketch_version, &events, params, mechanism)
        })
        .collect()
}

fn fold_group(
    epoch: u64,
    sketch_version: u64,
    events: &[&FeedbackEvent],
    params: &UpdateParams,
    mechanism: &mut GaussianMechanism,
) -> LearnerUpdate {
    let dims = events.first().map_or(0, |e| e.query_embedding.len());
    let num_buckets = events.iter().map(|e| e.num_buckets).max().unwrap_or(0);
    let leaf_count = events.iter().map(|e| e.leaf_count).max().unwrap_or(0);
    let mut centroid_sums = vec![vec![0.0; dims]; num_buckets as usize];
    let mut prior_sums = vec![0.0; leaf_count];

    for event in events {
        let buckets: Vec<u32> = if event.query_embedding.len() == dims {
            event.buckets.iter().copied().filter(|&b| b < num_buckets).collect()
        } else {
            Vec::new()
        };
        let credited: Vec<(usize, f64)> = event
            .credited
            .iter()
            .filter(|c| c.leaf_index < leaf_count)
            .map(|c| (c.leaf_index, c.reward))
            .collect();

        // Flattened contribution: bucket blocks, then one slot per credit.
        let mut contribution = Vec::with_capacity(buckets.len() * dims + credited.len());
        for _ in &buckets {
            contribution.extend(
                event
                    .query_embedding
                    .iter()
                    .map(|&x| params.learning_rate * x as f64),
            );
        }
        contribution.extend(credited.iter().map(|&(_, reward)| params.prior_step * reward));
        clip_to_norm(&mut contribution, params.clip_norm);

        let (centroid_part, prior_part) = contribution.split_at(buckets.len() * dims);
        for (&bucket, block) in buckets.iter().zip(centroid_part.chunks(dims.max(1))) {
            for (s, x) in centroid_sums[bucket as usize].iter_mut().zip(block) {
                *s += x;
            }
        }
        for (&(leaf_index, _), x) in credited.iter().zip(prior_part) {
            prior_sums[leaf_index] += x;
        }
    }

    let n = events.len().max(1) as f64;
    let centroid_deltas = centroid_sums
        .into_iter()
        .enumerate()
        .map(|(bucket, mut sum)| {
            mechanism.add_noise(&mut sum);
            CentroidDelta {
                bucket: bucket as u32,
                delta: sum.iter().map(|x| (x / n) as f32).collect(),
            }
        })
        .collect();

    mechanism.add_noise(&mut prior_sums);
    let prior_deltas = prior_sums
        .into_iter()
        .enumerate()
        .map(|(leaf_index, x)| PriorDelta {
            leaf_index,
            delta: (x / n) as f32,
        })
        .collect();

    LearnerUpdate {
        update_id: Uuid::new_v4().to_string(),
        epoch,
        base_sketch_version: sketch_version,
        centroid_deltas,
        prior_deltas,
        batch_size: events.len(),
        noise_scale: mechanism.sigma(),
        created_at: Utc::now(),
    }
}

/// Everything one worker thread needs.
pub(crate) struct WorkerContext {
    pub id: usize,
    pub receiver: Receiver<FeedbackEvent>,
    pub publisher: Arc<dyn IParameterPublisher>,
    pub stats: Arc<LearnerStats>,
    pub credits: Arc<DashMap<usize, u64>>,
    pub params: UpdateParams,
    pub batch_size: usize,
    pub mechanism: GaussianMechanism,
}

pub(crate) fn spawn(ctx: WorkerContext) -> PccResult<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("pcc-learner-{}", ctx.id))
        .spawn(move || run(ctx))
        .map_err(|e| {
            PccError::ConfigError(format!("failed to spawn learner worker: {e}"))
        })
}

/// Drain batches until the queue is closed and empty.
fn run(mut ctx: WorkerContext) {
    debug!(worker = ctx.id, "learner worker started");
    while let Ok(first) = ctx.receiver.recv() {
        let mut batch = vec![first];
        while batch.len() < ctx.batch_size {
            match ctx.receiver.try_recv() {
                Ok(event) => batch.push(event),
                Err(_) => break,
            }
        }
        process(&mut ctx, &batch);
    }
    debug!(worker = ctx.id, "learner worker stopped");
}

fn process(ctx: &mut WorkerContext, batch: &[FeedbackEvent]) {
    let _span = pcc_core::learn_span!(batch.len()).entered();
    ctx.stats.record_processed(batch.len());

    for update in build_update(batch, &ctx.params, &mut ctx.mechanism) {
        match ctx.publisher.publish(&update) {
            Ok(generation) => {
                ctx.stats.record_applied();
                let group = batch.iter().filter(|e| {
                    e.epoch == update.epoch && e.sketch_version == update.base_sketch_version
                });
                for event in group {
                    for c in &event.credited {
                        *ctx.credits.entry(c.leaf_index).or_insert(0) += 1;
                    }
                }
                info!(
                    worker = ctx.id,
                    generation,
                    batch_size = update.batch_size,
                    centroids = update.centroid_deltas.len(),
                    priors = update.prior_deltas.len(),
                    "learner update published"
                );
            }
            Err(PccError::LearnerError(LearnerError::StaleUpdate {
                update_epoch,
                current_epoch,
            })) => {
                ctx.stats.record_stale();
                debug!(update_epoch, current_epoch, "stale learner update discarded");
            }
            Err(e) => {
                ctx.stats.record_failed();
                warn!(worker = ctx.id, error = %e, "learner update failed");
            }
        }
    }
}
