//! # pcc-generation
//!
//! Turns certified evidence into a `Draft`: claims with exact citations.
//! A black-box `IClaimDecoder` proposes claims segment by segment; the
//! generator aligns every cited segment to a certificate span and, in
//! early-stop mode, halts a claim as soon as its running coverage would
//! fall below tau.

pub mod decoders;
pub mod generator;

pub use decoders::{ExtractiveDecoder, ScriptedDecoder};
pub use generator::Generator;
