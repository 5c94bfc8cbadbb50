//! # pcc-core
//!
//! Foundation crate for the proof-carrying context pipeline.
//! Defines all shared types, traits, errors, config, and telemetry helpers.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod telemetry;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::PccConfig;
pub use errors::{ErrorKind, PccError, PccResult};
pub use models::{Hash32, Policy};
