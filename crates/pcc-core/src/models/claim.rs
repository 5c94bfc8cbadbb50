use serde::{Deserialize, Serialize};

use super::corpus::OffsetRange;

/// One piece of decoder output, attributed to an evidence span or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSegment {
    pub text: String,
    /// Index into the evidence list the decoder was given.
    pub source: Option<usize>,
}

impl ClaimSegment {
    pub fn cited(text: impl Into<String>, source: usize) -> Self {
        Self {
            text: text.into(),
            source: Some(source),
        }
    }

    pub fn uncited(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }
}

/// A claim as proposed by the black-box decoder, before alignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposedClaim {
    pub segments: Vec<ClaimSegment>,
}

/// Links a byte range of a claim to the certificate span supporting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub claim_id: String,
    /// Index into `CoverageCertificate::spans`.
    pub span_index: usize,
    pub claim_range: OffsetRange,
}

/// A generated claim and the exact set of spans used to produce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub text: String,
    /// Sorted, deduplicated certificate span indices.
    pub span_indices: Vec<usize>,
    /// Generation stopped early because running coverage fell below tau.
    pub halted: bool,
}

/// Generator output: claims plus their citations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub query: String,
    pub claims: Vec<Claim>,
    pub citations: Vec<Citation>,
}

impl Draft {
    /// Citations belonging to one claim.
    pub fn citations_for<'a>(&'a self, claim_id: &'a str) -> impl Iterator<Item = &'a Citation> {
        self.citations.iter().filter(move |c| c.claim_id == claim_id)
    }
}
