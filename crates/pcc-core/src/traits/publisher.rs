use crate::errors::PccResult;
use crate::models::LearnerUpdate;

/// Merges a learner update into shared parameters by publishing a new
/// snapshot generation. Returns the new generation number.
pub trait IParameterPublisher: Send + Sync {
    fn publish(&self, update: &LearnerUpdate) -> PccResult<u64>;
}
