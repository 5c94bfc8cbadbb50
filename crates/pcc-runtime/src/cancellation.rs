//! Hand-off between a caller that may give up and the request it started.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const RUNNING: u8 = 0;
const CANCELLED: u8 = 1;
const DELIVERING: u8 = 2;

/// Shared cancellation state for one request.
///
/// The request claims delivery before it has any side effect outside the
/// answer itself (learner feedback). Once the caller cancels, delivery can
/// no longer be claimed; once delivery is claimed, cancelling fails and the
/// caller should wait for the answer.
#[derive(Debug, Clone)]
pub struct RequestCancellation {
    state: Arc<AtomicU8>,
}

impl RequestCancellation {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(RUNNING)),
        }
    }

    /// Give up on the request. Returns false when the request already
    /// claimed delivery.
    pub fn cancel(&self) -> bool {
        match self
            .state
            .compare_exchange(RUNNING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => true,
            Err(state) => state == CANCELLED,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == CANCELLED
    }

    /// Claim delivery. Returns false once the caller has cancelled.
    pub fn begin_delivery(&self) -> bool {
        match self
            .state
            .compare_exchange(RUNNING, DELIVERING, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => true,
            Err(state) => state == DELIVERING,
        }
    }
}

impl Default for RequestCancellation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_blocks_delivery() {
        let c = RequestCancellation::new();
        assert!(c.cancel());
        assert!(c.is_cancelled());
        assert!(!c.begin_delivery());
        assert!(c.cancel());
    }

    #[test]
    fn delivery_blocks_cancel() {
        let c = RequestCancellation::new();
        let shared = c.clone();
        assert!(shared.begin_delivery());
        assert!(!c.cancel());
        assert!(!c.is_cancelled());
        assert!(shared.begin_delivery());
    }
}
