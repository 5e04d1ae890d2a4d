//! Background downsample engine with a rayon worker pool
//!
//! Each submitted request runs as a fork-join on the engine's pool:
//!
//! 1. A coordinator task is spawned on the pool (`submit` never blocks)
//! 2. The coordinator fans out one reduction per output column with
//!    `par_iter_mut`, each task writing only its own slot
//! 3. The join completes when every column is written or skipped
//! 4. The status word moves `Running -> Completed` and the callback runs,
//!    unless the request was cancelled first
//!
//! Cancellation is checked before each column's reduction and before
//! delivery. A column that has already started always runs to completion.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tokio::sync::oneshot;

use crate::buffer::AudioBuffer;
use crate::config::EngineConfig;
use crate::types::{SampleData, SampleRange};

use super::error::EngineResult;
use super::handle::{DownsampleHandle, TaskState};
use super::partition::RemainderPolicy;
use super::reduce::reduce_window;
use super::request::{DownsampleRequest, DownsampleResult};

/// Parallel min/max downsampler
///
/// Cheap to clone; clones share the worker pool. One engine can serve any
/// number of waveform views at once.
#[derive(Clone)]
pub struct DownsampleEngine {
    /// Worker pool for coordinators and column reductions
    pool: Arc<rayon::ThreadPool>,
    /// Source of request ids
    next_id: Arc<AtomicU64>,
    /// Policy applied by [`request`](Self::request)
    remainder: RemainderPolicy,
}

impl DownsampleEngine {
    /// Create an engine with its own worker pool
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        let prefix = config.thread_name_prefix.clone();
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(move |i| format!("{}-{}", prefix, i))
            .panic_handler(|_| log::error!("Downsample worker panicked, request dropped"));
        if config.worker_threads > 0 {
            builder = builder.num_threads(config.worker_threads);
        }
        let pool = builder.build()?;

        log::info!(
            "Downsample engine started with {} worker threads",
            pool.current_num_threads()
        );

        Ok(Self {
            pool: Arc::new(pool),
            next_id: Arc::new(AtomicU64::new(1)),
            remainder: config.remainder_policy,
        })
    }

    /// Create an engine from [`EngineConfig::default`]
    pub fn with_defaults() -> EngineResult<Self> {
        Self::new(&EngineConfig::default())
    }

    /// Number of threads in the worker pool
    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn remainder_policy(&self) -> RemainderPolicy {
        self.remainder
    }

    /// Build a request using this engine's configured remainder policy
    pub fn request(
        &self,
        buffer: Arc<AudioBuffer>,
        range: impl Into<SampleRange>,
        width: usize,
    ) -> DownsampleRequest {
        DownsampleRequest::new(buffer, range, width).with_remainder_policy(self.remainder)
    }

    /// Start computing `request` in the background (non-blocking)
    ///
    /// `on_complete` runs at most once, on a worker thread, with exactly
    /// `request.width()` columns. It never runs if the returned handle is
    /// cancelled before the engine delivers; in that case it is dropped
    /// without being called.
    pub fn submit<F>(&self, request: DownsampleRequest, on_complete: F) -> DownsampleHandle
    where
        F: FnOnce(DownsampleResult) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let state = Arc::new(TaskState::new(id));
        let handle = DownsampleHandle::new(state.clone());

        log::debug!("Downsample #{} submitted: {:?}", id, request);

        self.pool.spawn(move || {
            run_request(request, &state, on_complete);
        });

        handle
    }

    /// Start computing `request`, delivering through a oneshot channel
    ///
    /// The receiver resolves with the result, or with a `RecvError` if the
    /// request was cancelled. Await it from async code or call
    /// `blocking_recv()` from a plain thread.
    pub fn submit_oneshot(
        &self,
        request: DownsampleRequest,
    ) -> (DownsampleHandle, oneshot::Receiver<DownsampleResult>) {
        let (tx, rx) = oneshot::channel();
        let handle = self.submit(request, move |result| {
            let _ = tx.send(result);
        });
        (handle, rx)
    }
}

impl std::fmt::Debug for DownsampleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownsampleEngine")
            .field("worker_threads", &self.pool.current_num_threads())
            .field("remainder", &self.remainder)
            .finish()
    }
}

/// Coordinator for one request, runs on a pool thread
fn run_request<F>(request: DownsampleRequest, state: &TaskState, on_complete: F)
where
    F: FnOnce(DownsampleResult),
{
    if state.is_cancelled() {
        log::debug!("Downsample #{} cancelled before start", state.id());
        return;
    }

    let start_time = Instant::now();
    let buffer = request.buffer();
    if let Err(e) = buffer.validate() {
        log::warn!(
            "Downsample #{}: malformed buffer ({}), missing samples read as silence",
            state.id(),
            e
        );
    }

    let partition = request.partition();
    let mut columns = vec![SampleData::ZERO; partition.width()];

    columns
        .par_iter_mut()
        .enumerate()
        .for_each(|(column, slot)| {
            // Skip, never abort: a started column always finishes
            if state.is_cancelled() {
                return;
            }
            *slot = reduce_window(buffer, partition.window(column));
        });

    if !state.complete() {
        log::debug!(
            "Downsample #{} cancelled after {:?}, result discarded",
            state.id(),
            start_time.elapsed()
        );
        return;
    }

    log::debug!(
        "[PERF] Downsample #{}: {} columns over {} frames ({} per column) in {:?}",
        state.id(),
        partition.width(),
        partition.range().len(),
        partition.samples_per_point(),
        start_time.elapsed()
    );

    on_complete(DownsampleResult::new(columns));
}
