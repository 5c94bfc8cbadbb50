mod decoder;
mod embedding;
mod entailment;
mod publisher;
mod span_store;

pub use decoder::IClaimDecoder;
pub use embedding::IEmbeddingProvider;
pub use entailment::IEntailmentScorer;
pub use publisher::IParameterPublisher;
pub use span_store::ISpanStore;
