//! Cancellation handle for a submitted downsample
//!
//! Each submitted request owns one status word:
//!
//! ```text
//!            cancel()
//! Running ────────────► Cancelled
//!    │
//!    └────────────────► Completed   (engine, right before delivery)
//! ```
//!
//! Both transitions are compare-exchanges from `Running`, so exactly one of
//! them wins. A handle whose `cancel()` returned `true` is guaranteed never
//! to see its completion callback run.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const RUNNING: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;

/// Lifecycle state of a submitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Columns are being computed
    Running,
    /// The result was handed to the completion callback
    Completed,
    /// Cancelled before delivery; the callback never runs
    Cancelled,
}

/// Status word shared between a handle and the engine's workers
#[derive(Debug)]
pub(crate) struct TaskState {
    id: u64,
    status: AtomicU8,
}

impl TaskState {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            status: AtomicU8::new(RUNNING),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.status.load(Ordering::Acquire) == CANCELLED
    }

    pub(crate) fn status(&self) -> TaskStatus {
        match self.status.load(Ordering::Acquire) {
            RUNNING => TaskStatus::Running,
            COMPLETED => TaskStatus::Completed,
            _ => TaskStatus::Cancelled,
        }
    }

    /// `Running -> Cancelled`; false if already terminal
    pub(crate) fn cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    /// `Running -> Completed`; false if cancelled first
    pub(crate) fn complete(&self) -> bool {
        self.transition(COMPLETED)
    }

    fn transition(&self, to: u8) -> bool {
        self.status
            .compare_exchange(RUNNING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Caller-side handle to one in-flight downsample
///
/// Dropping the handle does not cancel the computation; call
/// [`cancel`](Self::cancel) when the request goes stale.
#[derive(Debug)]
pub struct DownsampleHandle {
    state: Arc<TaskState>,
}

impl DownsampleHandle {
    pub(crate) fn new(state: Arc<TaskState>) -> Self {
        Self { state }
    }

    /// Engine-assigned request id (monotonic per engine)
    pub fn id(&self) -> u64 {
        self.state.id()
    }

    /// Cancel the computation
    ///
    /// Returns `true` if this call cancelled it. Returns `false` if it was
    /// already cancelled or the result has already been delivered.
    /// Idempotent.
    pub fn cancel(&self) -> bool {
        let cancelled = self.state.cancel();
        if cancelled {
            log::debug!("Downsample #{} cancelled", self.state.id());
        }
        cancelled
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// True once the request reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.state.status() != TaskStatus::Running
    }

    pub fn status(&self) -> TaskStatus {
        self.state.status()
    }
}
