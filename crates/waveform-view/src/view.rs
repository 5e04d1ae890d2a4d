//! Waveform view state with a single live downsample request
//!
//! A view is one on-screen waveform. Its visible range and pixel width change
//! on every zoom/pan gesture tick and every resize, and each change makes the
//! previous computation stale. `WaveformView` owns exactly one outstanding
//! [`DownsampleHandle`]: every change cancels and releases the old handle
//! before submitting the new request.
//!
//! Results come back over a channel tagged with a generation number. A result
//! that raced its cancellation (delivered just before `cancel()` landed) still
//! carries the old generation and is dropped by [`poll`](WaveformView::poll),
//! so the view never shows a superseded waveform.
//!
//! ## Usage
//!
//! ```ignore
//! let mut view = WaveformView::new(engine.clone(), buffer.clone());
//!
//! // On resize / gesture:
//! view.set_width(1600);
//! view.set_range(visible_range);
//!
//! // In the UI tick handler:
//! if view.poll() {
//!     draw(view.columns());
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use waveform_core::{
    AudioBuffer, BufferError, DownsampleEngine, DownsampleHandle, DownsampleResult, SampleRange,
};

/// Result of one downsample, tagged with the view generation it was made for
#[derive(Debug, Clone)]
pub struct ViewUpdate {
    /// View generation at submission time
    pub generation: u64,
    /// Range the columns cover
    pub range: SampleRange,
    /// Column count requested
    pub width: usize,
    /// Downsampled columns
    pub columns: DownsampleResult,
}

/// One waveform view backed by a shared downsample engine
pub struct WaveformView {
    engine: DownsampleEngine,
    buffer: Arc<AudioBuffer>,
    range: SampleRange,
    width: usize,
    /// Bumped on every resubmission
    generation: u64,
    /// The only live request of this view
    current: Option<DownsampleHandle>,
    /// Columns of the newest applied update
    columns: DownsampleResult,
    applied_generation: Option<u64>,
    update_tx: Sender<ViewUpdate>,
    update_rx: Receiver<ViewUpdate>,
}

impl WaveformView {
    /// Create a view covering the whole buffer
    ///
    /// Nothing is computed until a non-zero width is set.
    pub fn new(engine: DownsampleEngine, buffer: Arc<AudioBuffer>) -> Self {
        let range = buffer.full_range();
        let (update_tx, update_rx) = channel::unbounded();

        Self {
            engine,
            buffer,
            range,
            width: 0,
            generation: 0,
            current: None,
            columns: DownsampleResult::default(),
            applied_generation: None,
            update_tx,
            update_rx,
        }
    }

    /// Create a view covering a time span of the buffer
    ///
    /// Requires the buffer's sample rate.
    pub fn with_time_range(
        engine: DownsampleEngine,
        buffer: Arc<AudioBuffer>,
        start_secs: f64,
        duration_secs: f64,
    ) -> Result<Self, BufferError> {
        let range = buffer.time_range(start_secs, duration_secs)?;
        let mut view = Self::new(engine, buffer);
        view.range = range;
        Ok(view)
    }

    /// Change the column count; returns false if unchanged
    pub fn set_width(&mut self, width: usize) -> bool {
        if width == self.width {
            return false;
        }
        self.width = width;
        self.refresh();
        true
    }

    /// Change the visible range; returns false if unchanged after clamping
    pub fn set_range(&mut self, range: impl Into<SampleRange>) -> bool {
        let range = range.into().clamp_to(self.buffer.frame_count());
        if range == self.range {
            return false;
        }
        self.range = range;
        self.refresh();
        true
    }

    /// Change range and width together with a single resubmission
    pub fn set_view(&mut self, range: impl Into<SampleRange>, width: usize) -> bool {
        let range = range.into().clamp_to(self.buffer.frame_count());
        if range == self.range && width == self.width {
            return false;
        }
        self.range = range;
        self.width = width;
        self.refresh();
        true
    }

    /// Cancel the outstanding request and submit one for the current state
    pub fn refresh(&mut self) {
        if let Some(stale) = self.current.take() {
            stale.cancel();
        }

        self.generation += 1;
        let generation = self.generation;
        let range = self.range;
        let width = self.width;
        let tx = self.update_tx.clone();

        let request = self.engine.request(self.buffer.clone(), range, width);
        let handle = self.engine.submit(request, move |columns| {
            let _ = tx.send(ViewUpdate {
                generation,
                range,
                width,
                columns,
            });
        });

        log::debug!(
            "WaveformView: generation {} submitted as #{} ({}..{}, {} columns)",
            generation,
            handle.id(),
            range.lower,
            range.upper,
            width
        );
        self.current = Some(handle);
    }

    /// Apply the newest finished update, if any (non-blocking)
    ///
    /// Returns true if the displayed columns changed. Updates from older
    /// generations are discarded.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok(update) = self.update_rx.try_recv() {
            applied |= self.apply(update);
        }
        applied
    }

    /// Block until the current generation's update arrives or `timeout`
    /// elapses; returns true if it was applied
    ///
    /// Returns false at once if nothing was ever submitted.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        if self.is_up_to_date() {
            return true;
        }
        if self.current.is_none() {
            return false;
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.update_rx.recv_timeout(remaining) {
                Ok(update) => {
                    if self.apply(update) {
                        return true;
                    }
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    log::error!("WaveformView: update channel disconnected unexpectedly");
                    return false;
                }
            }
        }
    }

    fn apply(&mut self, update: ViewUpdate) -> bool {
        if update.generation != self.generation {
            log::debug!(
                "WaveformView: dropping stale generation {} (current {})",
                update.generation,
                self.generation
            );
            return false;
        }

        self.columns = update.columns;
        self.applied_generation = Some(update.generation);
        // Finished; nothing left to cancel
        self.current = None;
        true
    }

    /// Columns of the newest applied update
    pub fn columns(&self) -> &DownsampleResult {
        &self.columns
    }

    /// True once the columns match the current range and width
    pub fn is_up_to_date(&self) -> bool {
        self.applied_generation == Some(self.generation)
    }

    /// True while a request for the current state is still computing
    pub fn is_pending(&self) -> bool {
        self.current.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn range(&self) -> SampleRange {
        self.range
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn buffer(&self) -> &Arc<AudioBuffer> {
        &self.buffer
    }
}

impl Drop for WaveformView {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }
}

impl std::fmt::Debug for WaveformView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveformView")
            .field("range", &self.range)
            .field("width", &self.width)
            .field("generation", &self.generation)
            .field("applied_generation", &self.applied_generation)
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveform_core::config::EngineConfig;
    use waveform_core::{downsample, DownsampleRequest, SampleData};

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn engine() -> DownsampleEngine {
        let _ = env_logger::builder().is_test(true).try_init();
        DownsampleEngine::new(&EngineConfig {
            worker_threads: 2,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    fn ramp(frames: usize) -> Arc<AudioBuffer> {
        let left: Vec<f32> = (0..frames).map(|i| (i as f32 / frames as f32) * 2.0 - 1.0).collect();
        let right: Vec<f32> = left.iter().map(|s| -s * 0.5).collect();
        Arc::new(AudioBuffer::planar(vec![left, right]).unwrap())
    }

    #[test]
    fn test_nothing_submitted_until_width_set() {
        let view = WaveformView::new(engine(), ramp(100));
        assert_eq!(view.generation(), 0);
        assert_eq!(view.range(), SampleRange::new(0, 100));
        assert!(!view.is_pending());
        assert!(view.columns().is_empty());
    }

    #[test]
    fn test_width_change_delivers_columns() {
        let buffer = Arc::new(
            AudioBuffer::planar(vec![vec![-1.0, 0.5, 0.2, 0.9, -0.9, 0.1, 0.3, -0.3, 0.7, -0.7]]).unwrap(),
        );
        let mut view = WaveformView::new(engine(), buffer);

        assert!(view.set_width(5));
        assert!(view.wait_for_update(TIMEOUT));
        assert!(view.is_up_to_date());
        assert!(!view.is_pending());
        assert_eq!(
            view.columns().as_slice(),
            &[
                SampleData::new(-1.0, 0.5),
                SampleData::new(0.2, 0.9),
                SampleData::new(-0.9, 0.1),
                SampleData::new(-0.3, 0.7),
                SampleData::new(-0.7, 0.7),
            ]
        );
    }

    #[test]
    fn test_unchanged_parameters_do_not_resubmit() {
        let mut view = WaveformView::new(engine(), ramp(1000));
        assert!(view.set_width(10));
        let generation = view.generation();

        assert!(!view.set_width(10));
        assert!(!view.set_range(0..1000));
        // Clamps to the same range
        assert!(!view.set_range(0..5000));
        assert!(!view.set_view(0..1000, 10));
        assert_eq!(view.generation(), generation);
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let mut view = WaveformView::new(engine(), ramp(1000));
        view.set_width(4);
        assert!(view.wait_for_update(TIMEOUT));
        let current = view.columns().clone();

        // A late result from a superseded request
        view.update_tx
            .send(ViewUpdate {
                generation: view.generation() - 1,
                range: SampleRange::new(0, 10),
                width: 4,
                columns: vec![SampleData::new(-9.0, 9.0); 4].into(),
            })
            .unwrap();

        assert!(!view.poll());
        assert_eq!(view.columns(), &current);
    }

    #[test]
    fn test_rapid_changes_settle_on_latest_state() {
        let buffer = ramp(200_000);
        let mut view = WaveformView::new(engine(), buffer.clone());
        view.set_width(800);

        for step in 0..100usize {
            let lower = step * 1000;
            view.set_range(lower..lower + 50_000);
            // Interleave UI ticks with gesture ticks
            if step % 10 == 0 {
                view.poll();
            }
        }

        assert!(view.wait_for_update(TIMEOUT));
        assert_eq!(view.range(), SampleRange::new(99_000, 149_000));

        let expected = downsample(&DownsampleRequest::new(buffer, 99_000..149_000, 800));
        assert_eq!(view.columns(), &expected);

        // Nothing older can replace the settled result
        std::thread::sleep(Duration::from_millis(50));
        assert!(!view.poll());
        assert_eq!(view.columns(), &expected);
    }

    #[test]
    fn test_superseded_requests_never_send_updates() {
        let engine = DownsampleEngine::new(&EngineConfig {
            worker_threads: 1,
            ..EngineConfig::default()
        })
        .unwrap();
        let buffer = ramp(100_000);

        // Occupy the only worker so every request below queues behind it
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let (started_tx, started_rx) = std::sync::mpsc::channel::<()>();
        let _blocker = engine.submit(engine.request(buffer.clone(), 0..0, 0), move |_| {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        });
        started_rx.recv().unwrap();

        let mut view = WaveformView::new(engine, buffer.clone());
        view.set_width(100);
        let mut previous_id = view.current.as_ref().unwrap().id();
        for step in 1..=5usize {
            view.set_range(step * 1000..step * 1000 + 50_000);
            let id = view.current.as_ref().unwrap().id();
            assert_ne!(id, previous_id);
            previous_id = id;
        }
        let final_generation = view.generation();
        assert_eq!(final_generation, 6);

        drop(release_tx);

        let mut received = Vec::new();
        loop {
            let update = view.update_rx.recv_timeout(TIMEOUT).unwrap();
            received.push(update.generation);
            if update.generation == final_generation {
                break;
            }
        }
        assert_eq!(received, vec![final_generation]);

        // Anything still queued behind the final request has run by now
        std::thread::sleep(Duration::from_millis(50));
        assert!(view.update_rx.try_recv().is_err());
    }

    #[test]
    fn test_wait_without_submission_returns_immediately() {
        let mut view = WaveformView::new(engine(), ramp(100));
        let start = Instant::now();
        assert!(!view.wait_for_update(TIMEOUT));
        assert!(start.elapsed() < TIMEOUT);
    }

    #[test]
    fn test_set_view_single_generation() {
        let mut view = WaveformView::new(engine(), ramp(10_000));
        assert!(view.set_view(2_000..4_000, 20));
        assert_eq!(view.generation(), 1);
        assert!(view.wait_for_update(TIMEOUT));
        assert_eq!(view.columns().len(), 20);
    }

    #[test]
    fn test_time_range_constructor() {
        let buffer = Arc::new(
            AudioBuffer::planar(vec![vec![0.0; 48_000]])
                .unwrap()
                .with_sample_rate(8_000),
        );
        let view = WaveformView::with_time_range(engine(), buffer, 1.0, 2.5).unwrap();
        assert_eq!(view.range(), SampleRange::new(8_000, 28_000));

        let no_rate = ramp(10);
        let err = WaveformView::with_time_range(engine(), no_rate, 0.0, 1.0).unwrap_err();
        assert_eq!(err, BufferError::MissingSampleRate);
    }

    #[test]
    fn test_drop_with_request_in_flight() {
        let mut view = WaveformView::new(engine(), ramp(500_000));
        view.set_width(2000);
        drop(view);
    }
}
