use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hash::Hash32;

/// A source document submitted for commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub text: String,
    /// Last modification time. Newer documents win retrieval ties.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(doc_id: impl Into<String>, text: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            doc_id: doc_id.into(),
            text: text.into(),
            updated_at,
        }
    }
}

/// Half-open byte range `[start, end)` into a document or claim text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OffsetRange {
    pub start: usize,
    pub end: usize,
}

impl OffsetRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stable lexical identity of a span: `(doc_id, chunk_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanRef {
    pub doc_id: String,
    pub chunk_id: u32,
}

impl SpanRef {
    pub fn new(doc_id: impl Into<String>, chunk_id: u32) -> Self {
        Self {
            doc_id: doc_id.into(),
            chunk_id,
        }
    }
}

impl fmt::Display for SpanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.doc_id, self.chunk_id)
    }
}

/// A committed Merkle leaf. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorpusLeaf {
    pub doc_id: String,
    pub chunk_id: u32,
    /// blake3 of the span text.
    pub span_hash: Hash32,
}

impl CorpusLeaf {
    pub fn span_ref(&self) -> SpanRef {
        SpanRef::new(self.doc_id.clone(), self.chunk_id)
    }
}

/// A committed span with its text and position, as held by the span store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub leaf: CorpusLeaf,
    /// Position of the leaf in the committed tree.
    pub leaf_index: usize,
    pub offset_range: OffsetRange,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}
