//! Engine configuration
//!
//! - Generic YAML config loading/saving
//! - Default config location
//! - [`EngineConfig`]: worker pool and partitioning settings
//!
//! # Usage
//!
//! ```ignore
//! use waveform_core::config::{default_config_path, load_config, EngineConfig};
//!
//! let config: EngineConfig = load_config(&default_config_path("engine.yaml"));
//! let engine = DownsampleEngine::new(&config)?;
//! ```

mod engine;
mod io;
mod paths;

pub use engine::EngineConfig;
pub use io::{load_config, save_config};
pub use paths::{default_config_dir, default_config_path};
