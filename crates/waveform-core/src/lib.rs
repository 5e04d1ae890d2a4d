//! Waveform Core - Cancellable parallel waveform downsampling
//!
//! Reduces multi-channel PCM audio to one `(min, max)` pair per display
//! column, off the interactive thread, with cooperative cancellation so a
//! superseded zoom/pan request never delivers a stale result.
//!
//! ## Modules
//!
//! - [`buffer`]: Read-only audio buffer model (planar or interleaved storage)
//! - [`types`]: Sample ranges and per-column peak data
//! - [`downsample`]: Partitioning, reduction, and the background engine
//! - [`config`]: YAML engine configuration

pub mod buffer;
pub mod config;
pub mod downsample;
pub mod types;

pub use buffer::{AudioBuffer, BufferError};
pub use downsample::{
    downsample, DownsampleEngine, DownsampleHandle, DownsampleRequest, DownsampleResult,
    EngineError, Partition, RemainderPolicy, TaskStatus, Window,
};
pub use types::*;
