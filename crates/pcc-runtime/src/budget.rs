//! Per-request latency and memory budget.

use std::cell::Cell;
use std::time::{Duration, Instant};

use pcc_core::constants::BYTES_PER_MB;
use pcc_core::errors::{BudgetResource, PccError, PccResult};
use pcc_core::models::Policy;
use tracing::warn;

/// Deadline plus a working-memory meter. One per request, not shared.
#[derive(Debug)]
pub struct Budget {
    started: Instant,
    deadline: Instant,
    latency_ms: u64,
    memory_limit: u64,
    used: Cell<u64>,
}

impl Budget {
    pub fn new(policy: &Policy) -> Self {
        Self::with_limits(
            Duration::from_millis(policy.latency_budget_ms()),
            policy.memory_budget_mb().saturating_mul(BYTES_PER_MB),
        )
    }

    pub fn with_limits(latency: Duration, memory_bytes: u64) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: started + latency,
            latency_ms: latency.as_millis() as u64,
            memory_limit: memory_bytes,
            used: Cell::new(0),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn used_bytes(&self) -> u64 {
        self.used.get()
    }

    /// Fail with `BudgetExceeded` once the deadline has passed.
    pub fn check(&self, stage: &str) -> PccResult<()> {
        if Instant::now() > self.deadline {
            let used = self.elapsed_ms();
            warn!(stage, used_ms = used, limit_ms = self.latency_ms, "latency budget exceeded");
            return Err(PccError::BudgetExceeded {
                resource: BudgetResource::Latency,
                stage: stage.to_string(),
                used,
                limit: self.latency_ms,
            });
        }
        Ok(())
    }

    /// Account `bytes` of request memory; fail when the total passes the limit.
    pub fn charge(&self, stage: &str, bytes: u64) -> PccResult<()> {
        let used = self.used.get().saturating_add(bytes);
        self.used.set(used);
        if used > self.memory_limit {
            warn!(stage, used_bytes = used, limit_bytes = self.memory_limit, "memory budget exceeded");
            return Err(PccError::BudgetExceeded {
                resource: BudgetResource::Memory,
                stage: stage.to_string(),
                used,
                limit: self.memory_limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pcc_core::ErrorKind;

    use super::*;

    #[test]
    fn fresh_budget_passes() {
        let b = Budget::new(&Policy::default());
        b.check("start").unwrap();
        b.charge("fetch", 1024).unwrap();
        assert_eq!(b.used_bytes(), 1024);
        assert!(b.remaining() > Duration::ZERO);
    }

    #[test]
    fn expired_deadline_fails_with_stage() {
        let b = Budget::with_limits(Duration::from_millis(1), 1 << 20);
        std::thread::sleep(Duration::from_millis(5));
        let err = b.check("retrieve").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BudgetExceeded);
        assert!(err.to_string().contains("retrieve"));
        assert_eq!(b.remaining(), Duration::ZERO);
    }

    #[test]
    fn memory_is_cumulative() {
        let b = Budget::with_limits(Duration::from_secs(10), 100);
        b.charge("a", 60).unwrap();
        let err = b.charge("b", 60).unwrap_err();
        assert!(matches!(
            err,
            PccError::BudgetExceeded {
                resource: BudgetResource::Memory,
                used: 120,
                limit: 100,
                ..
            }
        ));
    }
}
