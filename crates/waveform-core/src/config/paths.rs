//! Path utilities for waveform configuration files

use std::path::PathBuf;

/// Get the default configuration directory
///
/// Returns: `<config_dir>/waveform` (e.g. `~/.config/waveform` on Linux),
/// falling back to `./waveform` when the platform has no config dir.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("waveform")
}

/// Get the default config file path for a given file name
///
/// # Arguments
/// * `filename` - Config file name (e.g., "engine.yaml")
pub fn default_config_path(filename: &str) -> PathBuf {
    default_config_dir().join(filename)
}
