//! In-memory span store over one committed epoch.

use std::sync::Arc;

use pcc_commitment::CorpusCommitment;
use pcc_core::errors::PccResult;
use pcc_core::models::SpanRecord;
use pcc_core::traits::ISpanStore;

#[derive(Debug, Clone)]
pub struct InMemorySpanStore {
    records: Arc<[SpanRecord]>,
}

impl InMemorySpanStore {
    pub fn from_commitment(commitment: &CorpusCommitment) -> Self {
        Self {
            records: commitment.records().into(),
        }
    }
}

impl ISpanStore for InMemorySpanStore {
    fn fetch(&self, leaf_index: usize) -> PccResult<Option<SpanRecord>> {
        Ok(self.records.get(leaf_index).cloned())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
