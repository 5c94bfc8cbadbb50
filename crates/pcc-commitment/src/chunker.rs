//! Span chunking.
//!
//! Splits text into spans of at most `max_bytes` bytes, preferring to break
//! after a sentence terminator, then at whitespace, then at any char boundary.
//! Leading and trailing whitespace is trimmed from each span; whitespace-only
//! text yields no spans.

use pcc_core::models::OffsetRange;

/// Byte ranges of the spans of `text`, in order.
pub fn chunk_text(text: &str, max_bytes: usize) -> Vec<OffsetRange> {
    let max_bytes = max_bytes.max(1);
    let mut spans = Vec::new();
    let mut pos = skip_whitespace(text, 0);

    while pos < text.len() {
        let end = if text.len() - pos <= max_bytes {
            text.len()
        } else {
            cut_point(text, pos, max_bytes)
        };
        let trimmed_end = pos + text[pos..end].trim_end().len();
        if trimmed_end > pos {
            spans.push(OffsetRange::new(pos, trimmed_end));
        }
        pos = skip_whitespace(text, end);
    }
    spans
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    let rest = &text[from..];
    from + (rest.len() - rest.trim_start().len())
}

/// Largest char boundary `<= index`.
fn floor_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn cut_point(text: &str, pos: usize, max_bytes: usize) -> usize {
    let limit = floor_boundary(text, pos + max_bytes);
    let window = &text[pos..limit];

    let mut sentence_end = None;
    let mut space_end = None;
    for (i, c) in window.char_indices() {
        let after = pos + i + c.len_utf8();
        if matches!(c, '.' | '!' | '?')
            && text[after..].chars().next().map_or(true, char::is_whitespace)
        {
            sentence_end = Some(after);
        } else if c.is_whitespace() && i > 0 {
            space_end = Some(pos + i);
        }
    }

    if let Some(end) = sentence_end.or(space_end) {
        return end;
    }
    if limit > pos {
        return limit;
    }
    // A single char wider than the limit still has to go somewhere.
    pos + text[pos..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pieces<'a>(text: &'a str, max: usize) -> Vec<&'a str> {
        chunk_text(text, max)
            .into_iter()
            .map(|r| &text[r.start..r.end])
            .collect()
    }

    #[test]
    fn short_text_is_one_span() {
        assert_eq!(pieces("  Paris is in France.  ", 100), vec!["Paris is in France."]);
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        assert!(chunk_text("   \n\t ", 10).is_empty());
        assert!(chunk_text("", 10).is_empty());
    }

    #[test]
    fn prefers_sentence_boundaries() {
        let text = "One two. Three four five. Six.";
        assert_eq!(pieces(text, 20), vec!["One two.", "Three four five.", "Six."]);
    }

    #[test]
    fn falls_back_to_whitespace() {
        let text = "alpha beta gamma delta";
        assert_eq!(pieces(text, 11), vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn hard_cut_respects_char_boundaries() {
        let text = "ééééé";
        let spans = chunk_text(text, 3);
        for r in &spans {
            assert!(text.is_char_boundary(r.start) && text.is_char_boundary(r.end));
            assert!(r.len() <= 3);
        }
        let joined: String = spans.iter().map(|r| &text[r.start..r.end]).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn spans_never_exceed_limit() {
        let text = "a b c d e f g h i j k l m n o p. q r s t u v w x y z.";
        for max in 1..20 {
            for r in chunk_text(text, max) {
                assert!(r.len() <= max.max(1), "max={max} len={}", r.len());
            }
        }
    }

    #[test]
    fn decimal_points_do_not_split() {
        let text = "Pi is 3.14 roughly and e is 2.71 also.";
        assert_eq!(pieces(text, 26)[0], "Pi is 3.14 roughly and e");
    }
}
