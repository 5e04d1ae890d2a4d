//! Downsample engine configuration

use serde::{Deserialize, Serialize};

use crate::downsample::RemainderPolicy;

/// Settings for a [`DownsampleEngine`](crate::DownsampleEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads in the engine's pool
    /// 0 lets rayon pick (one per logical CPU).
    /// Default: 0
    pub worker_threads: usize,

    /// Prefix for worker thread names (`{prefix}-{index}`)
    /// Default: "waveform-downsample"
    pub thread_name_prefix: String,

    /// Handling of tail frames left over by the integer column split
    /// Default: exclude (tail frames are not drawn)
    pub remainder_policy: RemainderPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            thread_name_prefix: "waveform-downsample".to_string(),
            remainder_policy: RemainderPolicy::Exclude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: EngineConfig = serde_yaml::from_str("worker_threads: 3\n").unwrap();
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.thread_name_prefix, "waveform-downsample");
        assert_eq!(config.remainder_policy, RemainderPolicy::Exclude);
    }

    #[test]
    fn test_remainder_policy_yaml_names() {
        let config: EngineConfig = serde_yaml::from_str("remainder_policy: fold_into_last\n").unwrap();
        assert_eq!(config.remainder_policy, RemainderPolicy::FoldIntoLast);

        let yaml = serde_yaml::to_string(&EngineConfig::default()).unwrap();
        assert!(yaml.contains("remainder_policy: exclude"));
    }
}
