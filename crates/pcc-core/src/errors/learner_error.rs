/// Online learner errors.
#[derive(Debug, thiserror::Error)]
pub enum LearnerError {
    #[error("learner queue full: capacity {capacity}")]
    QueueFull { capacity: usize },

    #[error("learner is shut down")]
    Shutdown,

    #[error("stale update: built for epoch {update_epoch}, current epoch is {current_epoch}")]
    StaleUpdate { update_epoch: u64, current_epoch: u64 },

    #[error("invalid privacy parameters: {reason}")]
    InvalidPrivacy { reason: String },
}
