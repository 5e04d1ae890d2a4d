//! Common types for waveform downsampling
//!
//! Sample ranges describe which frames of a buffer a view covers; sample
//! data is the `(min, max)` summary of one display column.

use std::ops::Range;

/// Audio sample type
pub type Sample = f32;

/// Min/max amplitude of one output column
///
/// The zero value `{ min: 0.0, max: 0.0 }` doubles as the "no samples
/// observed" sentinel. Use [`Window::valid_length`](crate::Window::valid_length)
/// to tell an empty window apart from genuine silence.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleData {
    pub min: Sample,
    pub max: Sample,
}

impl SampleData {
    /// The empty-window sentinel
    pub const ZERO: SampleData = SampleData { min: 0.0, max: 0.0 };

    #[inline]
    pub fn new(min: Sample, max: Sample) -> Self {
        Self { min, max }
    }

    /// Widen this pair to include another pair
    #[inline]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Largest absolute amplitude covered by this column
    #[inline]
    pub fn peak(&self) -> Sample {
        self.min.abs().max(self.max.abs())
    }
}

impl From<(Sample, Sample)> for SampleData {
    fn from((min, max): (Sample, Sample)) -> Self {
        Self { min, max }
    }
}

/// Half-open range of frame indices `[lower, upper)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SampleRange {
    pub lower: usize,
    pub upper: usize,
}

impl SampleRange {
    /// Create a range, swapping inverted bounds so `lower <= upper` holds
    pub fn new(lower: usize, upper: usize) -> Self {
        if lower <= upper {
            Self { lower, upper }
        } else {
            Self {
                lower: upper,
                upper: lower,
            }
        }
    }

    /// Range covering `start_secs .. start_secs + duration_secs`
    ///
    /// Frame positions are truncated (`seconds * sample_rate` rounded toward
    /// zero). Negative times clamp to frame 0.
    pub fn from_time(start_secs: f64, duration_secs: f64, sample_rate: u32) -> Self {
        let rate = sample_rate as f64;
        let start = (start_secs.max(0.0) * rate) as usize;
        let end = ((start_secs + duration_secs).max(0.0) * rate) as usize;
        Self::new(start, end)
    }

    /// Number of frames covered
    #[inline]
    pub fn len(&self) -> usize {
        self.upper - self.lower
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.upper == self.lower
    }

    /// Bound both ends to `[0, frame_count]`
    pub fn clamp_to(&self, frame_count: usize) -> Self {
        Self {
            lower: self.lower.min(frame_count),
            upper: self.upper.min(frame_count),
        }
    }

    pub fn as_range(&self) -> Range<usize> {
        self.lower..self.upper
    }
}

impl From<Range<usize>> for SampleRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}
