//! Merges learner updates into new snapshot generations.

use std::sync::Arc;

use pcc_core::config::SketchConfig;
use pcc_core::errors::{LearnerError, PccResult};
use pcc_core::models::LearnerUpdate;
use pcc_core::traits::IParameterPublisher;
use pcc_sketch::SketchBucketDirectory;
use tracing::debug;

use crate::snapshot::{Snapshot, SnapshotCell};

pub struct SnapshotPublisher {
    cell: Arc<SnapshotCell>,
    sketch: SketchConfig,
}

impl SnapshotPublisher {
    pub fn new(cell: Arc<SnapshotCell>, sketch: SketchConfig) -> Self {
        Self { cell, sketch }
    }
}

impl IParameterPublisher for SnapshotPublisher {
    /// Apply centroid deltas (new sketch version, directory rebuilt from the
    /// PQ reconstructions) and prior deltas (new index version). Updates
    /// built for another corpus epoch are refused.
    fn publish(&self, update: &LearnerUpdate) -> PccResult<u64> {
        self.cell.publish(|current| {
            if update.epoch != current.epoch() {
                return Err(LearnerError::StaleUpdate {
                    update_epoch: update.epoch,
                    current_epoch: current.epoch(),
                }
                .into());
            }

            let (encoder, directory) = if update.centroid_deltas.is_empty() {
                (Arc::clone(&current.encoder), Arc::clone(&current.directory))
            } else {
                let encoder = current.encoder.apply_centroid_deltas(&update.centroid_deltas)?;
                let directory = SketchBucketDirectory::build(
                    &encoder,
                    &current.index.decoded_embeddings()?,
                    self.sketch.assignments_per_chunk,
                    self.sketch.balance_slack,
                )?;
                (Arc::new(encoder), Arc::new(directory))
            };

            let index = if update.prior_deltas.is_empty() {
                Arc::clone(&current.index)
            } else {
                Arc::new(current.index.with_prior_deltas(&update.prior_deltas))
            };

            debug!(
                update_id = %update.update_id,
                sketch_version = encoder.version(),
                index_version = index.version(),
                "learner update merged"
            );
            Ok(Snapshot {
                generation: current.generation,
                commitment: Arc::clone(&current.commitment),
                store: Arc::clone(&current.store),
                encoder,
                directory,
                index,
            })
        })
    }
}
