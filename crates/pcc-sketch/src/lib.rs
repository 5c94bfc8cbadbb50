//! # pcc-sketch
//!
//! Query pre-pruning. A sketch encoder maps a query embedding to a few
//! bucket ids; the bucket directory lists which committed chunks live in each
//! bucket. Both carry the parameter version they were built from, and a new
//! version is only ever produced copy-on-write.

pub mod directory;
pub mod encoder;
pub mod training;

pub use directory::{OccupancyStats, SketchBucketDirectory};
pub use encoder::{SketchEncoder, SketchOutput};

/// Certificate stamp for a sketch parameter version.
pub fn version_tag(version: u64) -> String {
    format!("sketch-v{version}")
}
