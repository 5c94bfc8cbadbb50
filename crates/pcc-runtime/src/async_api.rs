//! Async entry point over the blocking pipeline.

use std::sync::Arc;
use std::time::Duration;

use pcc_core::errors::{BudgetResource, PccError, PccResult};
use pcc_core::models::Policy;
use tokio::task::JoinError;
use tracing::{debug, warn};

use crate::answer::Answer;
use crate::cancellation::RequestCancellation;
use crate::engine::PccEngine;

/// Slack on top of the policy's latency budget before the caller gives up.
const TIMEOUT_GRACE: Duration = Duration::from_millis(50);

/// Runs [`PccEngine::answer`] on tokio's blocking pool.
#[derive(Clone)]
pub struct AsyncPccEngine {
    engine: Arc<PccEngine>,
}

impl AsyncPccEngine {
    pub fn new(engine: Arc<PccEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<PccEngine> {
        &self.engine
    }

    /// Answer `query`, returning `BudgetExceeded` if the blocking task
    /// outlives the latency budget plus a short grace period.
    ///
    /// A timed-out request is cancelled so it submits no learner feedback.
    /// If it already passed that point, its answer is awaited instead.
    pub async fn answer(&self, query: impl Into<String>, policy: Policy) -> PccResult<Answer> {
        let engine = Arc::clone(&self.engine);
        let query = query.into();
        let budget = Duration::from_millis(policy.latency_budget_ms());
        let cancel = RequestCancellation::new();
        let mut task = {
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || {
                engine.answer_with_cancellation(&query, &policy, &cancel)
            })
        };

        match tokio::time::timeout(budget + TIMEOUT_GRACE, &mut task).await {
            Ok(joined) => flatten(joined),
            Err(_) if !cancel.cancel() => {
                debug!("answer already delivering, waiting past the grace period");
                flatten(task.await)
            }
            Err(_) => {
                let limit = budget.as_millis() as u64;
                warn!(limit_ms = limit, "async answer timed out");
                Err(PccError::BudgetExceeded {
                    resource: BudgetResource::Latency,
                    stage: "async".to_string(),
                    used: (budget + TIMEOUT_GRACE).as_millis() as u64,
                    limit,
                })
            }
        }
    }
}

fn flatten(joined: Result<PccResult<Answer>, JoinError>) -> PccResult<Answer> {
    joined.map_err(|join| PccError::DecoderError {
        reason: format!("answer task failed: {join}"),
    })?
}
