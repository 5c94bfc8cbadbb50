//! Built-in `IClaimDecoder` implementations.

mod extractive;
mod scripted;

pub use extractive::ExtractiveDecoder;
pub use scripted::ScriptedDecoder;
