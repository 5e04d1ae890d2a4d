//! Min/max downsampling of audio buffers for waveform display
//!
//! ## Usage
//!
//! ```ignore
//! let engine = DownsampleEngine::with_defaults()?;
//!
//! // On every width / visible-range change:
//! if let Some(old) = current.take() {
//!     old.cancel();
//! }
//! let request = engine.request(buffer.clone(), visible_range, width);
//! current = Some(engine.submit(request, move |columns| {
//!     let _ = ui_tx.send(columns);
//! }));
//! ```
//!
//! `waveform-view` wraps this pattern so each view holds exactly one live
//! handle.

mod engine;
mod error;
mod handle;
mod partition;
mod reduce;
mod request;

pub use engine::DownsampleEngine;
pub use error::{EngineError, EngineResult};
pub use handle::{DownsampleHandle, TaskStatus};
pub use partition::{Partition, RemainderPolicy, Window};
pub use reduce::{channel_extent, downsample, reduce_window};
pub use request::{DownsampleRequest, DownsampleResult};
