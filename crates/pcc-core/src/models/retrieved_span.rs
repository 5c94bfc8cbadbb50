use serde::{Deserialize, Serialize};

use super::corpus::{OffsetRange, SpanRef};

/// A span returned by the retriever for one query. Ephemeral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedSpan {
    pub doc_id: String,
    pub chunk_id: u32,
    pub leaf_index: usize,
    pub offset_range: OffsetRange,
    pub similarity_score: f32,
}

impl RetrievedSpan {
    pub fn span_ref(&self) -> SpanRef {
        SpanRef::new(self.doc_id.clone(), self.chunk_id)
    }
}

/// A retrieved span together with its fetched text, as handed to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSpan {
    pub span: RetrievedSpan,
    pub text: String,
}
