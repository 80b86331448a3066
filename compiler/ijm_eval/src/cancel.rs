//! External cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag an outside actor sets to stop a run.
///
/// The interpreter polls it at every statement; a run blocked inside a host
/// call notices only after that call returns.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the run stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
