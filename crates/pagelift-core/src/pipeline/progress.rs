//! Progress notification and cooperative cancellation for the
//! conversion pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-way progress notification sink.
///
/// Called with a percentage (0-100), a human-readable status line and
/// the current page number when one applies. There is no
/// acknowledgment or backpressure; implementations must not block the
/// pipeline.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8, status: &str, current_page: Option<u32>);
}

impl<F> ProgressSink for F
where
    F: Fn(u8, &str, Option<u32>) + Send + Sync,
{
    fn report(&self, percent: u8, status: &str, current_page: Option<u32>) {
        self(percent, status, current_page)
    }
}

/// Sink used when the caller does not observe progress.
pub(crate) struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _percent: u8, _status: &str, _current_page: Option<u32>) {}
}

/// Cooperative cancellation flag, checked between pages and before
/// packaging. Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The pipeline stops at its next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
