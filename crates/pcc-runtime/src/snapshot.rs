//! Versioned, copy-on-write engine state.

use std::sync::{Arc, Mutex, RwLock, Weak};

use pcc_commitment::CorpusCommitment;
use pcc_core::config::RetrievalConfig;
use pcc_core::errors::{PccError, PccResult};
use pcc_core::traits::ISpanStore;
use pcc_core::Hash32;
use pcc_retrieval::{PqIndex, Retriever};
use pcc_sketch::{SketchBucketDirectory, SketchEncoder};
use tracing::debug;

/// Everything a request reads, frozen at one generation.
pub struct Snapshot {
    pub generation: u64,
    pub commitment: Arc<CorpusCommitment>,
    pub store: Arc<dyn ISpanStore>,
    pub encoder: Arc<SketchEncoder>,
    pub directory: Arc<SketchBucketDirectory>,
    pub index: Arc<PqIndex>,
}

impl Snapshot {
    pub fn epoch(&self) -> u64 {
        self.commitment.epoch()
    }

    pub fn root(&self) -> Hash32 {
        self.commitment.root()
    }

    pub fn retriever(&self, config: &RetrievalConfig) -> Retriever {
        Retriever::new(
            config.clone(),
            Arc::clone(&self.index),
            Arc::clone(&self.directory),
        )
    }
}

/// Holds the current [`Snapshot`].
///
/// Readers pin an `Arc` and keep it for the whole request. Writers are
/// serialized and swap in a complete new snapshot. A generation is freed
/// when its last pinned `Arc` drops.
pub struct SnapshotCell {
    current: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
    generations: Mutex<Vec<(u64, Weak<Snapshot>)>>,
}

impl SnapshotCell {
    pub fn new(initial: Snapshot) -> Self {
        let initial = Arc::new(initial);
        let generations = vec![(initial.generation, Arc::downgrade(&initial))];
        Self {
            current: RwLock::new(initial),
            writer: Mutex::new(()),
            generations: Mutex::new(generations),
        }
    }

    /// The current snapshot.
    pub fn pin(&self) -> PccResult<Arc<Snapshot>> {
        self.current
            .read()
            .map(|g| Arc::clone(&g))
            .map_err(|_| poisoned())
    }

    /// Build a successor of the current snapshot with `next` and publish it
    /// as generation `current + 1`. Returns the new generation.
    ///
    /// `next` runs outside the reader lock; readers keep the old snapshot
    /// until the swap.
    pub fn publish(
        &self,
        next: impl FnOnce(&Snapshot) -> PccResult<Snapshot>,
    ) -> PccResult<u64> {
        let _writer = self.writer.lock().map_err(|_| poisoned())?;
        let base = self.pin()?;
        let mut successor = next(&base)?;
        successor.generation = base.generation + 1;
        let generation = successor.generation;
        let successor = Arc::new(successor);

        {
            let mut slot = self.current.write().map_err(|_| poisoned())?;
            *slot = Arc::clone(&successor);
        }
        let mut gens = self.generations.lock().map_err(|_| poisoned())?;
        gens.retain(|(_, w)| w.strong_count() > 0);
        gens.push((generation, Arc::downgrade(&successor)));
        debug!(generation, live = gens.len(), "snapshot published");
        Ok(generation)
    }

    pub fn generation(&self) -> PccResult<u64> {
        Ok(self.pin()?.generation)
    }

    /// Generations still reachable from some reader or the cell itself,
    /// ascending.
    pub fn live_generations(&self) -> Vec<u64> {
        match self.generations.lock() {
            Ok(mut gens) => {
                gens.retain(|(_, w)| w.strong_count() > 0);
                gens.iter().map(|(g, _)| *g).collect()
            }
            Err(_) => Vec::new(),
        }
    }
}

fn poisoned() -> PccError {
    PccError::ConfigError("snapshot lock poisoned".into())
}
