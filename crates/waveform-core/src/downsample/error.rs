//! Downsample engine error types

use thiserror::Error;

/// Errors that can occur while setting up the engine
///
/// The compute path itself never fails: degraded input produces a
/// zero-filled result and cancellation is a terminal state, not an error.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Worker pool could not be created
    #[error("Failed to build downsample thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for engine setup
pub type EngineResult<T> = Result<T, EngineError>;
