//! Deterministic ranking of scored candidates.
//!
//! Order: similarity descending, then recency (newer first), then
//! `(doc_id, chunk_id)` ascending. Scores are compared with `total_cmp`, so
//! NaN never makes the order ambiguous.

use std::cmp::Ordering;

use crate::pq::SpanMeta;

/// Compare two scored candidates; `Less` ranks first.
pub fn compare(a: (&SpanMeta, f32), b: (&SpanMeta, f32)) -> Ordering {
    b.1.total_cmp(&a.1)
        .then_with(|| b.0.updated_at.cmp(&a.0.updated_at))
        .then_with(|| a.0.doc_id.cmp(&b.0.doc_id))
        .then_with(|| a.0.chunk_id.cmp(&b.0.chunk_id))
}

/// Best `k` of `(leaf_index, score)` pairs in ranking order.
pub fn top_k<'a>(
    mut scored: Vec<(usize, f32)>,
    k: usize,
    meta: impl Fn(usize) -> Option<&'a SpanMeta>,
) -> Vec<(usize, f32)> {
    scored.retain(|(i, _)| meta(*i).is_some());
    scored.sort_by(|x, y| match (meta(x.0), meta(y.0)) {
        (Some(a), Some(b)) => compare((a, x.1), (b, y.1)),
        _ => Ordering::Equal,
    });
    scored.truncate(k);
    scored
}
