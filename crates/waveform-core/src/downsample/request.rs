//! Downsample requests and results

use std::ops::Deref;
use std::sync::Arc;

use crate::buffer::AudioBuffer;
use crate::types::{SampleData, SampleRange};

use super::partition::{Partition, RemainderPolicy};

/// Immutable description of one downsample computation
///
/// Created fresh for every width or visible-range change and never mutated
/// afterwards. The buffer is shared read-only with every worker.
#[derive(Clone)]
pub struct DownsampleRequest {
    buffer: Arc<AudioBuffer>,
    range: SampleRange,
    width: usize,
    remainder: RemainderPolicy,
}

impl DownsampleRequest {
    /// Create a request covering `range` with `width` output columns
    ///
    /// The range is clamped to `[0, frame_count]` of the buffer.
    pub fn new(buffer: Arc<AudioBuffer>, range: impl Into<SampleRange>, width: usize) -> Self {
        let range = range.into().clamp_to(buffer.frame_count());
        Self {
            buffer,
            range,
            width,
            remainder: RemainderPolicy::default(),
        }
    }

    /// Choose how tail frames left by the integer split are handled
    pub fn with_remainder_policy(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    #[inline]
    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    /// Shared handle to the source buffer
    pub fn shared_buffer(&self) -> &Arc<AudioBuffer> {
        &self.buffer
    }

    #[inline]
    pub fn range(&self) -> SampleRange {
        self.range
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn remainder_policy(&self) -> RemainderPolicy {
        self.remainder
    }

    /// Column windows for this request
    pub fn partition(&self) -> Partition {
        Partition::new(self.range, self.width, self.remainder)
    }
}

impl std::fmt::Debug for DownsampleRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownsampleRequest")
            .field(
                "buffer",
                &format!(
                    "<Arc<AudioBuffer> {} ch x {} frames>",
                    self.buffer.channel_count(),
                    self.buffer.frame_count()
                ),
            )
            .field("range", &self.range)
            .field("width", &self.width)
            .field("remainder", &self.remainder)
            .finish()
    }
}

/// Downsampled waveform: one `SampleData` per output column, left to right
///
/// Always exactly `width` entries long. Immutable once delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownsampleResult {
    columns: Vec<SampleData>,
}

impl DownsampleResult {
    pub fn new(columns: Vec<SampleData>) -> Self {
        Self { columns }
    }

    pub fn as_slice(&self) -> &[SampleData] {
        &self.columns
    }

    pub fn into_vec(self) -> Vec<SampleData> {
        self.columns
    }

    /// Overall extent of the whole result, `None` when empty
    pub fn extent(&self) -> Option<SampleData> {
        self.columns.iter().copied().reduce(|a, b| a.merge(&b))
    }
}

impl Deref for DownsampleResult {
    type Target = [SampleData];

    fn deref(&self) -> &Self::Target {
        &self.columns
    }
}

impl FromIterator<SampleData> for DownsampleResult {
    fn from_iter<I: IntoIterator<Item = SampleData>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<SampleData>> for DownsampleResult {
    fn from(columns: Vec<SampleData>) -> Self {
        Self { columns }
    }
}
