//! Waveform view state for interactive displays
//!
//! Bridges UI-side parameter changes (resize, zoom, pan) to the background
//! [`DownsampleEngine`](waveform_core::DownsampleEngine) while keeping at
//! most one live request per view.
//!
//! - [`WaveformView`]: owns the single outstanding request of one view
//! - [`ViewUpdate`]: generation-tagged result delivered to the view

mod view;

pub use view::{ViewUpdate, WaveformView};

// Re-export commonly used core items
pub use waveform_core::{AudioBuffer, DownsampleEngine, DownsampleResult, SampleData, SampleRange};
