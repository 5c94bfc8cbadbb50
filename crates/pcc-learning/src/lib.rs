//! # pcc-learning
//!
//! Asynchronous parameter updates from answer feedback.
//!
//! Accepted, unflagged answers credit the spans they cited. Feedback goes
//! onto a bounded queue that never blocks the caller; a worker pool folds
//! it into clipped, noised deltas and hands them to an
//! `IParameterPublisher`, which swaps in a new snapshot generation.

pub mod engine;
pub mod privacy;
pub mod queue;
pub mod span_credit;
pub mod stats;
pub mod worker;

pub use engine::OnlineLearner;
pub use privacy::{clip_to_norm, GaussianMechanism};
pub use queue::FeedbackQueue;
pub use span_credit::{credit_spans, CREDIT_REWARD};
pub use stats::{LearnerStats, LearnerStatsSnapshot};
pub use worker::{build_update, UpdateParams};
