//! Deterministic extractive decoder: quotes the evidence sentences that share
//! the most content words with the query.

use std::collections::HashSet;

use pcc_core::errors::PccResult;
use pcc_core::models::{ClaimSegment, EvidenceSpan, ProposedClaim};
use pcc_core::traits::IClaimDecoder;
use pcc_verifier::tokenize;

/// Query tokens shorter than this are ignored when matching.
const MIN_QUERY_TOKEN_LEN: usize = 4;

const DEFAULT_MAX_CLAIMS: usize = 3;

#[derive(Debug, Clone)]
pub struct ExtractiveDecoder {
    max_claims: usize,
}

impl ExtractiveDecoder {
    pub fn new(max_claims: usize) -> Self {
        Self {
            max_claims: max_claims.max(1),
        }
    }
}

impl Default for ExtractiveDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CLAIMS)
    }
}

impl IClaimDecoder for ExtractiveDecoder {
    fn decode(&self, query: &str, evidence: &[EvidenceSpan]) -> PccResult<Vec<ProposedClaim>> {
        let terms: HashSet<String> = tokenize(query)
            .into_iter()
            .filter(|t| t.chars().count() >= MIN_QUERY_TOKEN_LEN)
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // (overlap, evidence index, sentence)
        let mut scored: Vec<(usize, usize, &str)> = Vec::new();
        for (i, e) in evidence.iter().enumerate() {
            for sentence in sentences(&e.text) {
                let words: HashSet<String> = tokenize(sentence).into_iter().collect();
                let overlap = terms.intersection(&words).count();
                if overlap > 0 {
                    scored.push((overlap, i, sentence));
                }
            }
        }
        // Stable: ties keep evidence order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(self.max_claims)
            .map(|(_, i, sentence)| ProposedClaim {
                segments: vec![ClaimSegment::cited(sentence, i)],
            })
            .collect())
    }

    fn name(&self) -> &str {
        "extractive"
    }
}

/// Sentences of `text`: split after '.', '!' or '?' followed by whitespace.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let at_break = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |(_, next)| next.is_whitespace());
        if at_break {
            let end = i + c.len_utf8();
            let s = text[start..end].trim();
            if !s.is_empty() {
                out.push(s);
            }
            start = end;
        }
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}
