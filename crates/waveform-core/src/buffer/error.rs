//! Audio buffer error types

use thiserror::Error;

/// Errors raised when a buffer layout does not describe its storage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A buffer needs at least one channel
    #[error("Audio buffer has no channels")]
    NoChannels,

    /// Stride must advance at least one element per frame
    #[error("Audio buffer stride must be at least 1")]
    ZeroStride,

    /// A channel's last frame lies beyond the end of the storage
    #[error("Channel {channel} needs {required} samples of storage, only {available} available")]
    StorageTooShort {
        channel: usize,
        required: usize,
        available: usize,
    },

    /// Interleaved storage length is not a multiple of the channel count
    #[error("Interleaved storage of {len} samples does not divide into {channels} channels")]
    UnevenInterleave { len: usize, channels: usize },

    /// Time-based ranges need the buffer's sample rate
    #[error("Audio buffer has no sample rate")]
    MissingSampleRate,
}

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;
