//! Per-window min/max reduction
//!
//! Pure functions of `(buffer, window)`: no shared mutable state, safe to
//! run on any worker thread.

use crate::buffer::AudioBuffer;
use crate::types::SampleData;

use super::partition::Window;
use super::request::{DownsampleRequest, DownsampleResult};

/// Min/max of one channel over a window, `None` if the channel holds no
/// samples there
pub fn channel_extent(buffer: &AudioBuffer, channel: usize, window: Window) -> Option<SampleData> {
    let mut samples = buffer.channel_samples(channel, window.start, window.end);
    let first = samples.next()?;

    Some(samples.fold(SampleData::new(first, first), |acc, sample| SampleData {
        min: acc.min.min(sample),
        max: acc.max.max(sample),
    }))
}

/// Min/max across all channels over a window
///
/// The column minimum is the smallest channel minimum and the column maximum
/// the largest channel maximum. A window with no readable samples (empty,
/// past the end of the buffer, or missing storage) yields
/// [`SampleData::ZERO`].
pub fn reduce_window(buffer: &AudioBuffer, window: Window) -> SampleData {
    if window.is_empty() {
        return SampleData::ZERO;
    }

    (0..buffer.channel_count())
        .filter_map(|channel| channel_extent(buffer, channel, window))
        .reduce(|a, b| a.merge(&b))
        .unwrap_or(SampleData::ZERO)
}

/// Downsample a request sequentially on the calling thread
///
/// Produces exactly what [`DownsampleEngine`](super::DownsampleEngine)
/// delivers for the same request, without cancellation.
pub fn downsample(request: &DownsampleRequest) -> DownsampleResult {
    let buffer = request.buffer();
    request
        .partition()
        .windows()
        .map(|window| reduce_window(buffer, window))
        .collect()
}
