use crate::errors::PccResult;
use crate::models::SpanRecord;

/// Storage of committed span text, addressed by leaf index.
pub trait ISpanStore: Send + Sync {
    /// Fetch a span record. `None` when the index is not in this epoch.
    fn fetch(&self, leaf_index: usize) -> PccResult<Option<SpanRecord>>;

    /// Number of committed spans.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
