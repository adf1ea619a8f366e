//! Cooperative abort flag for a running expedition.
//!
//! The simulator checks the flag once per step boundary, before the step's
//! delay. A step already sleeping runs to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared abort flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    /// A fresh, un-aborted handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run to stop at the next step boundary.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    /// Whether an abort was requested.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }
}
