//! Read-only PCM audio buffer
//!
//! The decoding collaborator hands over float samples in one contiguous
//! block. Each channel is addressed by a start offset plus a stride, so the
//! same type describes both storage layouts:
//!
//! ```text
//! planar      (stride 1):   [L0 L1 L2 L3 | R0 R1 R2 R3]   offsets [0, 4]
//! interleaved (stride 2):   [L0 R0 L1 R1 L2 R2 L3 R3]     offsets [0, 1]
//! ```
//!
//! Frame `f` of channel `c` is stored at `offsets[c] + f * stride`.
//!
//! Buffers are shared between worker threads behind an `Arc` and are never
//! mutated after construction.

mod error;

pub use error::{BufferError, BufferResult};

use crate::types::{Sample, SampleRange};

/// Decoded audio, read-only for the lifetime of any computation using it
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    data: Vec<Sample>,
    offsets: Vec<usize>,
    frame_count: usize,
    stride: usize,
    sample_rate: Option<u32>,
}

impl AudioBuffer {
    /// Create a buffer from storage plus an explicit per-channel layout
    ///
    /// Validates that every channel's last frame lies inside `data`.
    pub fn new(
        data: Vec<Sample>,
        offsets: Vec<usize>,
        frame_count: usize,
        stride: usize,
    ) -> BufferResult<Self> {
        let buffer = Self::from_raw_parts(data, offsets, frame_count, stride);
        buffer.validate()?;
        Ok(buffer)
    }

    /// Create a buffer from one `Vec` per channel (planar, stride 1)
    ///
    /// All channels must have the same length.
    pub fn planar(channels: Vec<Vec<Sample>>) -> BufferResult<Self> {
        let Some(frame_count) = channels.first().map(Vec::len) else {
            return Err(BufferError::NoChannels);
        };

        let mut data = Vec::with_capacity(frame_count * channels.len());
        let mut offsets = Vec::with_capacity(channels.len());
        for (channel, samples) in channels.into_iter().enumerate() {
            if samples.len() < frame_count {
                return Err(BufferError::StorageTooShort {
                    channel,
                    required: frame_count,
                    available: samples.len(),
                });
            }
            offsets.push(data.len());
            data.extend_from_slice(&samples[..frame_count]);
        }

        Self::new(data, offsets, frame_count, 1)
    }

    /// Create a buffer from interleaved frames (`ch0 ch1 .. chN` per frame)
    pub fn interleaved(data: Vec<Sample>, channel_count: usize) -> BufferResult<Self> {
        if channel_count == 0 {
            return Err(BufferError::NoChannels);
        }
        if data.len() % channel_count != 0 {
            return Err(BufferError::UnevenInterleave {
                len: data.len(),
                channels: channel_count,
            });
        }

        let frame_count = data.len() / channel_count;
        let offsets = (0..channel_count).collect();
        Self::new(data, offsets, frame_count, channel_count)
    }

    /// Wrap storage without validating the layout
    ///
    /// Reads past the end of `data` are treated as missing samples by the
    /// downsampler, so a malformed buffer degrades to a zero-filled waveform
    /// instead of panicking.
    pub fn from_raw_parts(
        data: Vec<Sample>,
        offsets: Vec<usize>,
        frame_count: usize,
        stride: usize,
    ) -> Self {
        Self {
            data,
            offsets,
            frame_count,
            stride,
            sample_rate: None,
        }
    }

    /// Attach the sample rate the audio was decoded at
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Check that the layout describes the storage
    pub fn validate(&self) -> BufferResult<()> {
        if self.offsets.is_empty() {
            return Err(BufferError::NoChannels);
        }
        if self.stride == 0 {
            return Err(BufferError::ZeroStride);
        }
        if self.frame_count == 0 {
            return Ok(());
        }

        for (channel, &offset) in self.offsets.iter().enumerate() {
            let required = (self.frame_count - 1)
                .checked_mul(self.stride)
                .and_then(|span| span.checked_add(offset))
                .and_then(|last| last.checked_add(1))
                .unwrap_or(usize::MAX);
            if required > self.data.len() {
                return Err(BufferError::StorageTooShort {
                    channel,
                    required,
                    available: self.data.len(),
                });
            }
        }

        Ok(())
    }

    /// Number of channels
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.offsets.len()
    }

    /// Samples per channel
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Element stride within a channel's storage
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Range covering every frame of the buffer
    pub fn full_range(&self) -> SampleRange {
        SampleRange::new(0, self.frame_count)
    }

    /// Range for a time span, clamped to the buffer
    pub fn time_range(&self, start_secs: f64, duration_secs: f64) -> BufferResult<SampleRange> {
        let rate = self.sample_rate.ok_or(BufferError::MissingSampleRate)?;
        Ok(SampleRange::from_time(start_secs, duration_secs, rate).clamp_to(self.frame_count))
    }

    /// Sample at `frame` of `channel`, `None` if outside the storage
    #[inline]
    pub fn sample(&self, channel: usize, frame: usize) -> Option<Sample> {
        if frame >= self.frame_count {
            return None;
        }
        let offset = *self.offsets.get(channel)?;
        let index = frame.checked_mul(self.stride)?.checked_add(offset)?;
        self.data.get(index).copied()
    }

    /// Iterate a channel's samples over `[start, end)`
    ///
    /// Stops early at the first frame that lies outside the storage, so a
    /// truncated channel yields only the samples it actually holds.
    pub fn channel_samples(
        &self,
        channel: usize,
        start: usize,
        end: usize,
    ) -> impl Iterator<Item = Sample> + '_ {
        let end = end.min(self.frame_count);
        let stride = self.stride.max(1);
        let (begin, count) = match self.offsets.get(channel) {
            Some(&offset) if start < end && self.stride > 0 => {
                (offset.saturating_add(start.saturating_mul(stride)), end - start)
            }
            _ => (self.data.len(), 0),
        };

        self.data
            .get(begin..)
            .unwrap_or(&[])
            .iter()
            .step_by(stride)
            .take(count)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_layout() {
        let buffer = AudioBuffer::planar(vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]]).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 3);
        assert_eq!(buffer.stride(), 1);
        assert_eq!(buffer.sample(1, 2), Some(-3.0));
        assert_eq!(buffer.sample(0, 3), None);
    }

    #[test]
    fn test_interleaved_layout() {
        let buffer = AudioBuffer::interleaved(vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0], 2).unwrap();
        assert_eq!(buffer.frame_count(), 3);
        assert_eq!(buffer.stride(), 2);
        assert_eq!(buffer.sample(0, 1), Some(2.0));
        assert_eq!(buffer.sample(1, 2), Some(-3.0));

        let right: Vec<_> = buffer.channel_samples(1, 1, 3).collect();
        assert_eq!(right, vec![-2.0, -3.0]);
    }

    #[test]
    fn test_rejects_malformed_layouts() {
        assert_eq!(AudioBuffer::planar(vec![]), Err(BufferError::NoChannels));
        assert_eq!(
            AudioBuffer::interleaved(vec![0.0; 5], 2),
            Err(BufferError::UnevenInterleave { len: 5, channels: 2 })
        );
        assert_eq!(
            AudioBuffer::new(vec![0.0; 4], vec![0], 4, 0),
            Err(BufferError::ZeroStride)
        );
        assert_eq!(
            AudioBuffer::planar(vec![vec![0.0; 3], vec![0.0; 2]]),
            Err(BufferError::StorageTooShort {
                channel: 1,
                required: 3,
                available: 2,
            })
        );

        // Channel 1 ends exactly at the end of storage
        assert!(AudioBuffer::new(vec![0.0; 6], vec![0, 2], 4, 1).is_ok());
    }

    #[test]
    fn test_storage_too_short_reports_channel() {
        let err = AudioBuffer::new(vec![0.0; 5], vec![0, 2], 4, 1).unwrap_err();
        assert_eq!(
            err,
            BufferError::StorageTooShort {
                channel: 1,
                required: 6,
                available: 5,
            }
        );
    }

    #[test]
    fn test_truncated_channel_yields_available_samples() {
        // Channel 1 claims 4 frames but only 2 exist in storage
        let buffer = AudioBuffer::from_raw_parts(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6], vec![0, 4], 4, 1);
        assert!(buffer.validate().is_err());

        let samples: Vec<_> = buffer.channel_samples(1, 0, 4).collect();
        assert_eq!(samples, vec![0.5, 0.6]);

        let missing: Vec<_> = buffer.channel_samples(7, 0, 4).collect();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_time_range_requires_sample_rate() {
        let buffer = AudioBuffer::planar(vec![vec![0.0; 100]]).unwrap();
        assert_eq!(buffer.time_range(0.0, 1.0), Err(BufferError::MissingSampleRate));

        let buffer = buffer.with_sample_rate(10);
        assert_eq!(buffer.time_range(2.0, 3.0).unwrap(), SampleRange::new(20, 50));
        assert_eq!(buffer.time_range(5.0, 30.0).unwrap(), SampleRange::new(50, 100));
    }
}
